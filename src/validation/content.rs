//! Validators for content elements: title, headings, paragraphs and anchors

use std::ops::Range;

use lazy_static::lazy_static;
use url::Url;

use super::{ElementValidator, Finding, FindingKind, ValidationResult};
use crate::document::DocumentContext;
use crate::markup::{self, Element, Tag, TagKind, BLOCK_LEVEL_TAGS, HEADING_TAGS};

lazy_static! {
    /// Base used to check relative references such as `/about` or `#top`
    static ref RELATIVE_BASE: Url = Url::parse("http://localhost/").unwrap();
}

/// Counts opening and closing tags of `name`, then walks them to reject
/// nesting. Returns the first problem found.
fn check_balance_and_nesting(context: &DocumentContext, name: &str, plural: &str) -> Option<Finding> {
    let tags: Vec<&Tag> = context
        .tags_named(name)
        .filter(|tag| tag.kind != TagKind::SelfClosing)
        .collect();

    let opens = tags.iter().filter(|tag| tag.is_open()).count();
    let closes = tags.len() - opens;
    if opens != closes {
        return Some(Finding::malformed(
            name,
            format!(
                "unbalanced tags: {} opening and {} closing",
                opens, closes
            ),
        ));
    }

    let mut depth = 0usize;
    for tag in tags {
        if tag.is_open() {
            depth += 1;
            if depth > 1 {
                return Some(Finding::structural(
                    name,
                    format!("{} must not be nested", plural),
                ));
            }
        } else if depth == 0 {
            return Some(Finding::malformed(
                name,
                format!("closing </{}> without a matching opening tag", name),
            ));
        } else {
            depth -= 1;
        }
    }

    None
}

/// First block-level tag inside `range`, if any
fn find_block_level<'a>(context: &'a DocumentContext, range: Range<usize>) -> Option<&'a Tag> {
    markup::tags_within(context.tags(), range)
        .find(|tag| BLOCK_LEVEL_TAGS.contains(&tag.name.as_str()))
}

/// Validator for the document `<title>`
#[derive(Default)]
pub struct TitleValidator;

impl TitleValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ElementValidator for TitleValidator {
    fn name(&self) -> &str {
        "title"
    }

    fn validate(&self, context: &DocumentContext) -> ValidationResult {
        let source = context.source();
        let head_range = markup::pair_elements(context.tags(), "head")
            .into_iter()
            .next()
            .map(|head| head.inner_range(source.len()));
        let titles = markup::pair_elements(context.tags(), "title");

        let (title, head_range) = match head_range.and_then(|range| {
            titles
                .iter()
                .find(|title| range.contains(&title.open.start))
                .map(|title| (title, range))
        }) {
            Some(found) => found,
            None => {
                return ValidationResult::failed(
                    Finding::missing("title").with_detail("a <title> is required inside <head>"),
                )
            }
        };

        if titles.len() > 1 {
            return ValidationResult::failed(
                Finding::not_unique("title")
                    .with_detail(format!("found {} <title> elements", titles.len())),
            );
        }

        // An unclosed title is read up to the end of the head
        let end = title
            .close
            .as_ref()
            .map_or(head_range.end, |close| close.start);
        let text = markup::text_content(&source[title.open.end..end.max(title.open.end)]);

        if text.is_empty() {
            return ValidationResult::failed(
                Finding::new(FindingKind::Empty, "title").with_detail("the title must not be blank"),
            );
        }

        if text
            .chars()
            .any(|c| c == char::REPLACEMENT_CHARACTER || (c.is_control() && !c.is_whitespace()))
        {
            return ValidationResult::failed(Finding::invalid_content(
                "title",
                "the title is not valid UTF-8 text",
            ));
        }

        ValidationResult::new()
    }
}

/// Validator for `<h1>` through `<h6>`
#[derive(Default)]
pub struct HeadingValidator;

impl HeadingValidator {
    pub fn new() -> Self {
        Self
    }

    /// Pair heading tags with one stack across all levels
    fn pair_headings(context: &DocumentContext) -> Result<Vec<Element>, Finding> {
        let mut stack: Vec<&Tag> = Vec::new();
        let mut elements = Vec::new();

        for tag in context
            .tags()
            .iter()
            .filter(|tag| HEADING_TAGS.contains(&tag.name.as_str()))
        {
            match tag.kind {
                TagKind::Open => stack.push(tag),
                TagKind::Close => match stack.last() {
                    Some(top) if top.name == tag.name => {
                        let open = (*top).clone();
                        stack.pop();
                        elements.push(Element {
                            open,
                            close: Some(tag.clone()),
                        });
                    }
                    Some(top) => {
                        return Err(Finding::structural(
                            tag.name.as_str(),
                            format!("</{}> closes an open <{}>", tag.name, top.name),
                        ))
                    }
                    None => {
                        return Err(Finding::structural(
                            tag.name.as_str(),
                            format!("closing </{}> without a matching opening tag", tag.name),
                        ))
                    }
                },
                TagKind::SelfClosing => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Finding::structural(
                open.name.as_str(),
                format!("<{}> is never closed", open.name),
            ));
        }

        elements.sort_by_key(|element| element.open.start);
        Ok(elements)
    }
}

impl ElementValidator for HeadingValidator {
    fn name(&self) -> &str {
        "heading"
    }

    fn validate(&self, context: &DocumentContext) -> ValidationResult {
        let source = context.source();
        let headings = match Self::pair_headings(context) {
            Ok(headings) => headings,
            Err(finding) => return ValidationResult::failed(finding),
        };

        for heading in &headings {
            let name = heading.open.name.as_str();
            let inner = heading.inner_range(source.len());

            if markup::text_content(&source[inner.clone()]).is_empty() {
                return ValidationResult::failed(Finding::invalid_content(
                    name,
                    "heading text must not be blank",
                ));
            }

            if let Some(block) = find_block_level(context, inner) {
                let detail = if HEADING_TAGS.contains(&block.name.as_str()) {
                    format!("headings must not be nested (found <{}>)", block.name)
                } else {
                    format!("block-level element <{}> is not allowed in a heading", block.name)
                };
                return ValidationResult::failed(Finding::invalid_content(name, detail));
            }
        }

        ValidationResult::new()
    }
}

/// Validator for `<p>` elements
#[derive(Default)]
pub struct ParagraphValidator;

impl ParagraphValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ElementValidator for ParagraphValidator {
    fn name(&self) -> &str {
        "p"
    }

    fn validate(&self, context: &DocumentContext) -> ValidationResult {
        if let Some(finding) = check_balance_and_nesting(context, "p", "paragraphs") {
            return ValidationResult::failed(finding);
        }

        let source = context.source();
        let paragraphs = markup::pair_elements(context.tags(), "p");

        for paragraph in &paragraphs {
            if let Some(block) = find_block_level(context, paragraph.inner_range(source.len())) {
                return ValidationResult::failed(Finding::invalid_content(
                    "p",
                    format!("block-level element <{}> is not allowed in a paragraph", block.name),
                ));
            }
        }

        let mut result = ValidationResult::new();
        for paragraph in &paragraphs {
            if markup::is_blank(paragraph.inner(source)) {
                result.add_warning(Finding::empty("p"));
            }
        }
        result
    }
}

/// Validator for `<a>` elements
#[derive(Default)]
pub struct AnchorValidator;

impl AnchorValidator {
    pub fn new() -> Self {
        Self
    }

    /// Absolute URLs must parse; relative references must resolve against a base
    pub fn is_valid_href(href: &str) -> bool {
        let href = href.trim();
        if href.is_empty() || href.chars().any(char::is_whitespace) {
            return false;
        }
        match Url::parse(href) {
            Ok(_) => true,
            Err(url::ParseError::RelativeUrlWithoutBase) => RELATIVE_BASE.join(href).is_ok(),
            Err(_) => false,
        }
    }
}

impl ElementValidator for AnchorValidator {
    fn name(&self) -> &str {
        "a"
    }

    fn validate(&self, context: &DocumentContext) -> ValidationResult {
        if let Some(finding) = check_balance_and_nesting(context, "a", "anchors") {
            return ValidationResult::failed(finding);
        }

        let source = context.source();
        for anchor in markup::pair_elements(context.tags(), "a") {
            let attributes = anchor.open.attributes();
            for (index, attribute) in attributes.iter().enumerate() {
                if attributes[..index].iter().any(|seen| seen.name == attribute.name) {
                    return ValidationResult::failed(Finding::malformed(
                        "a",
                        format!("duplicate attribute '{}'", attribute.name),
                    ));
                }
            }

            let href = match anchor.open.attribute("href") {
                Some(href) => href,
                None => continue,
            };

            if !Self::is_valid_href(&href) {
                return ValidationResult::failed(Finding::invalid_content(
                    "a",
                    format!("'{}' is not a valid URL", href),
                ));
            }

            if markup::text_content(anchor.inner(source)).is_empty() {
                return ValidationResult::failed(Finding::invalid_content(
                    "a",
                    format!("link to '{}' has no text", href),
                ));
            }
        }

        ValidationResult::new()
    }
}
