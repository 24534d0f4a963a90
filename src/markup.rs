//! Tag scanning utilities shared by validators and extractors.
//!
//! This is a small regex-driven tokenizer, not an HTML parser. It recognises
//! start, end and self-closing tags, skips anything inside `<!-- -->`
//! comments and tolerates `>` inside quoted attribute values. Tag and
//! attribute names are lowercased.

use std::borrow::Cow;
use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Start, end or self-closing tag. Group 1 is the slash of an end tag,
    /// group 2 the name and group 3 the raw attribute text.
    static ref TAG_REGEX: Regex = Regex::new(
        r#"<(/?)([a-zA-Z][a-zA-Z0-9-]*)(\s(?:[^>"']|"[^"]*"|'[^']*')*|/)?>"#
    ).unwrap();

    /// HTML comment, non-greedy so adjacent comments stay separate
    static ref COMMENT_REGEX: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();

    /// Document type declaration
    static ref DOCTYPE_REGEX: Regex = Regex::new(r"(?i)<!doctype\b[^>]*>").unwrap();

    /// One attribute with an optional double-quoted, single-quoted or bare value
    static ref ATTRIBUTE_REGEX: Regex = Regex::new(
        r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#
    ).unwrap();
}

/// Tags that may not appear inside headings and paragraphs
pub const BLOCK_LEVEL_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dialog",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

pub const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// A single attribute as written on a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercase attribute name
    pub name: String,
    /// Value with its quotes removed; `None` for a bare attribute
    pub value: Option<String>,
}

/// A tag occurrence with its byte span in the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lowercase tag name
    pub name: String,
    /// Opening, closing or self-closing
    pub kind: TagKind,
    /// Byte offset of the `<`
    pub start: usize,
    /// Byte offset just past the `>`
    pub end: usize,
    raw_attributes: String,
}

impl Tag {
    pub fn is_open(&self) -> bool {
        self.kind == TagKind::Open
    }

    pub fn is_close(&self) -> bool {
        self.kind == TagKind::Close
    }

    /// Attributes in source order, duplicates included
    pub fn attributes(&self) -> Vec<Attribute> {
        ATTRIBUTE_REGEX
            .captures_iter(&self.raw_attributes)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str().to_ascii_lowercase();
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|m| m.as_str().to_string());
                Some(Attribute { name, value })
            })
            .collect()
    }

    /// Value of the first attribute with this name; valueless attributes yield ""
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.unwrap_or_default())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes().iter().any(|attr| attr.name == name)
    }
}

/// An element formed by pairing a start tag with its end tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The opening tag
    pub open: Tag,
    /// Matching closing tag, if the element is closed
    pub close: Option<Tag>,
}

impl Element {
    /// Span between the tags; an unclosed element runs to the end of the text
    pub fn inner_range(&self, text_len: usize) -> Range<usize> {
        let end = self.close.as_ref().map_or(text_len, |close| close.start);
        self.open.end..end.max(self.open.end)
    }

    pub fn outer_range(&self, text_len: usize) -> Range<usize> {
        let end = self.close.as_ref().map_or(text_len, |close| close.end);
        self.open.start..end
    }

    pub fn inner<'s>(&self, text: &'s str) -> &'s str {
        &text[self.inner_range(text.len())]
    }

    pub fn is_closed(&self) -> bool {
        self.close.is_some()
    }
}

/// Byte ranges of all complete comments
pub fn comment_ranges(text: &str) -> Vec<Range<usize>> {
    COMMENT_REGEX.find_iter(text).map(|m| m.range()).collect()
}

/// Tokenize every tag outside comments, in source order
pub fn scan_tags(text: &str) -> Vec<Tag> {
    let comments = comment_ranges(text);
    let mut comment_index = 0;
    let mut tags = Vec::new();

    for caps in TAG_REGEX.captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };

        while comment_index < comments.len() && comments[comment_index].end <= whole.start() {
            comment_index += 1;
        }
        if comment_index < comments.len() && comments[comment_index].contains(&whole.start()) {
            continue;
        }

        let raw_attributes = caps.get(3).map_or("", |m| m.as_str());
        let kind = if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            TagKind::Close
        } else if raw_attributes.trim_end().ends_with('/') {
            TagKind::SelfClosing
        } else {
            TagKind::Open
        };

        tags.push(Tag {
            name: caps[2].to_ascii_lowercase(),
            kind,
            start: whole.start(),
            end: whole.end(),
            raw_attributes: raw_attributes.trim_end_matches('/').to_string(),
        });
    }

    tags
}

/// Pair start and end tags of one element name, innermost first.
///
/// Stray end tags are ignored; start tags left open produce elements without
/// a closing tag. The result is ordered by start position.
pub fn pair_elements(tags: &[Tag], name: &str) -> Vec<Element> {
    let mut stack: Vec<&Tag> = Vec::new();
    let mut elements = Vec::new();

    for tag in tags.iter().filter(|tag| tag.name == name) {
        match tag.kind {
            TagKind::Open => stack.push(tag),
            TagKind::Close => {
                if let Some(open) = stack.pop() {
                    elements.push(Element {
                        open: open.clone(),
                        close: Some(tag.clone()),
                    });
                }
            }
            TagKind::SelfClosing => {}
        }
    }

    elements.extend(stack.into_iter().map(|open| Element {
        open: open.clone(),
        close: None,
    }));
    elements.sort_by_key(|element| element.open.start);
    elements
}

/// Tags lying entirely inside `range`
pub fn tags_within(tags: &[Tag], range: Range<usize>) -> impl Iterator<Item = &Tag> {
    tags.iter()
        .filter(move |tag| tag.start >= range.start && tag.end <= range.end)
}

/// Position of the first document type declaration outside comments
pub fn find_doctype(text: &str) -> Option<Range<usize>> {
    let comments = comment_ranges(text);
    DOCTYPE_REGEX
        .find_iter(text)
        .map(|m| m.range())
        .find(|range| !comments.iter().any(|c| c.contains(&range.start)))
}

pub fn contains_doctype(text: &str) -> bool {
    find_doctype(text).is_some()
}

pub fn strip_comments(text: &str) -> Cow<'_, str> {
    COMMENT_REGEX.replace_all(text, "")
}

pub fn strip_doctypes(text: &str) -> Cow<'_, str> {
    DOCTYPE_REGEX.replace_all(text, "")
}

/// Visible text of a fragment: comments and tags removed, trimmed
pub fn text_content(fragment: &str) -> String {
    let without_comments = strip_comments(fragment);
    TAG_REGEX
        .replace_all(&without_comments, "")
        .trim()
        .to_string()
}

/// True when only whitespace and comments remain
pub fn is_blank(fragment: &str) -> bool {
    strip_comments(fragment).trim().is_empty()
}
