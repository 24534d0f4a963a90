//! Validators for the document skeleton: doctype, html, head and body

use super::{ElementValidator, Finding, ValidationResult};
use crate::document::DocumentContext;
use crate::markup::{self, Element};

/// Tags that may never appear inside `<body>`
pub const BODY_DISALLOWED_TAGS: &[&str] = &[
    "head", "html", "title", "meta", "link", "noscript", "style", "doctype",
];

/// Presentational attributes rejected on the `<body>` tag
pub const BODY_DISALLOWED_ATTRIBUTES: &[&str] =
    &["alink", "background", "bgcolor", "link", "text", "vlink"];

/// First element with the given name, paired against the whole document
fn first_element(context: &DocumentContext, name: &str) -> Option<Element> {
    markup::pair_elements(context.tags(), name).into_iter().next()
}

/// Validator for the document type declaration
#[derive(Default)]
pub struct DoctypeValidator;

impl DoctypeValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ElementValidator for DoctypeValidator {
    fn name(&self) -> &str {
        "doctype"
    }

    fn validate(&self, context: &DocumentContext) -> ValidationResult {
        let source = context.source();

        let doctype = match markup::find_doctype(source) {
            Some(range) => range,
            None => return ValidationResult::failed(Finding::missing("!DOCTYPE")),
        };

        // Only whitespace and comments may precede the declaration
        if !markup::is_blank(&source[..doctype.start]) {
            return ValidationResult::failed(Finding::structural(
                "!DOCTYPE",
                "the declaration must be the first content of the document",
            ));
        }

        ValidationResult::new()
    }
}

/// Validator for the root `<html>` element
#[derive(Default)]
pub struct HtmlValidator;

impl HtmlValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ElementValidator for HtmlValidator {
    fn name(&self) -> &str {
        "html"
    }

    fn validate(&self, context: &DocumentContext) -> ValidationResult {
        let source = context.source();
        let opens: Vec<_> = context.tags_named("html").filter(|t| t.is_open()).collect();
        let closes: Vec<_> = context.tags_named("html").filter(|t| t.is_close()).collect();

        let open = match opens.first() {
            Some(open) => *open,
            None => return ValidationResult::failed(Finding::missing("html")),
        };
        let close = match closes.iter().rev().find(|close| close.start >= open.end) {
            Some(close) => *close,
            None => {
                return ValidationResult::failed(Finding::malformed(
                    "html",
                    "the closing </html> tag is missing",
                ))
            }
        };

        if opens.len() > 1 {
            return ValidationResult::failed(
                Finding::not_unique("html")
                    .with_detail(format!("found {} opening tags", opens.len())),
            );
        }

        let prefix = markup::strip_comments(&source[..open.start]);
        if !markup::strip_doctypes(&prefix).trim().is_empty() {
            return ValidationResult::failed(Finding::structural(
                "html",
                "unexpected content before the opening <html> tag",
            ));
        }
        if !markup::is_blank(&source[close.end..]) {
            return ValidationResult::failed(Finding::structural(
                "html",
                "unexpected content after the closing </html> tag",
            ));
        }

        let inside = open.end..close.start;
        let bodies: Vec<_> = markup::tags_within(context.tags(), inside.clone())
            .filter(|tag| tag.name == "body" && tag.is_open())
            .collect();
        let body = match bodies.len() {
            0 => return ValidationResult::failed(Finding::missing("body")),
            1 => bodies[0],
            count => {
                return ValidationResult::failed(
                    Finding::not_unique("body")
                        .with_detail(format!("found {} <body> elements inside <html>", count)),
                )
            }
        };

        // Presence and uniqueness of <head> belong to the head validator
        if let Some(head) = markup::tags_within(context.tags(), inside)
            .find(|tag| tag.name == "head" && tag.is_open())
        {
            if head.start > body.start {
                return ValidationResult::failed(Finding::structural(
                    "head",
                    "<head> must come before <body>",
                ));
            }
        }

        let mut result = ValidationResult::new();
        let has_lang = open
            .attribute("lang")
            .is_some_and(|lang| !lang.trim().is_empty());
        if !has_lang {
            result.add_warning(
                Finding::recommended_attribute("lang")
                    .with_detail("declare the document language on <html>"),
            );
        }
        result
    }
}

/// Validator for the `<head>` element
#[derive(Default)]
pub struct HeadValidator;

impl HeadValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ElementValidator for HeadValidator {
    fn name(&self) -> &str {
        "head"
    }

    fn validate(&self, context: &DocumentContext) -> ValidationResult {
        let source = context.source();
        let opens: Vec<_> = context.tags_named("head").filter(|t| t.is_open()).collect();

        let open = match opens.first() {
            Some(open) => *open,
            None => return ValidationResult::failed(Finding::missing("head")),
        };

        if opens.len() > 1 {
            return ValidationResult::failed(
                Finding::not_unique("head")
                    .with_detail(format!("found {} opening tags", opens.len())),
            );
        }

        if let Some(html) = context
            .tags_named("html")
            .find(|tag| tag.is_open() && tag.end <= open.start)
        {
            if !source[html.end..open.start].trim().is_empty() {
                return ValidationResult::failed(Finding::structural(
                    "head",
                    "only whitespace may appear between <html> and <head>",
                ));
            }
        }

        let close = match context
            .tags_named("head")
            .find(|tag| tag.is_close() && tag.start >= open.end)
        {
            Some(close) => close,
            None => {
                return ValidationResult::failed(Finding::malformed(
                    "head",
                    "the closing </head> tag is missing",
                ))
            }
        };

        if let Some(nested) = markup::tags_within(context.tags(), open.end..close.start)
            .find(|tag| tag.name == "html" || tag.name == "body")
        {
            return ValidationResult::failed(Finding::structural(
                "head",
                format!("<{}> must not appear inside <head>", nested.name),
            ));
        }

        ValidationResult::new()
    }
}

/// Validator for the `<body>` element
#[derive(Default)]
pub struct BodyValidator;

impl BodyValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ElementValidator for BodyValidator {
    fn name(&self) -> &str {
        "body"
    }

    fn validate(&self, context: &DocumentContext) -> ValidationResult {
        let source = context.source();
        let open_count = context.tags_named("body").filter(|t| t.is_open()).count();

        if open_count == 0 {
            return ValidationResult::new();
        }
        if open_count > 1 {
            return ValidationResult::failed(
                Finding::not_unique("body").with_detail(format!("found {} opening tags", open_count)),
            );
        }

        let body = match first_element(context, "body") {
            Some(body) => body,
            None => return ValidationResult::new(),
        };
        let inside = body.inner_range(source.len());

        if let Some(tag) = markup::tags_within(context.tags(), inside.clone())
            .find(|tag| BODY_DISALLOWED_TAGS.contains(&tag.name.as_str()))
        {
            return ValidationResult::failed(Finding::invalid_content(
                "body",
                format!("disallowed tag <{}>", tag.name),
            ));
        }
        if markup::contains_doctype(&source[inside.clone()]) {
            return ValidationResult::failed(Finding::invalid_content(
                "body",
                "disallowed tag <!DOCTYPE>",
            ));
        }

        if let Some(attribute) = body
            .open
            .attributes()
            .into_iter()
            .find(|attr| BODY_DISALLOWED_ATTRIBUTES.contains(&attr.name.as_str()))
        {
            return ValidationResult::failed(Finding::malformed(
                "body",
                format!("attribute '{}' is not allowed", attribute.name),
            ));
        }

        let mut result = ValidationResult::new();
        if markup::is_blank(&source[inside]) {
            result.add_warning(Finding::empty("body"));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FindingKind;

    fn run(validator: &dyn ElementValidator, source: &str) -> ValidationResult {
        validator.validate(&DocumentContext::new(source))
    }

    #[test]
    fn test_doctype_missing_and_misplaced() {
        let validator = DoctypeValidator::new();
        assert!(run(&validator, "<!-- c -->\n<!DOCTYPE html><html></html>").is_valid());

        let result = run(&validator, "<html></html>");
        assert_eq!(result.errors()[0].kind, FindingKind::Missing);

        let result = run(&validator, "text<!DOCTYPE html>");
        assert_eq!(result.errors()[0].kind, FindingKind::Structural);
    }

    #[test]
    fn test_html_checks_in_order() {
        let validator = HtmlValidator::new();

        let result = run(&validator, "<p>no root</p>");
        assert_eq!(result.errors()[0].kind, FindingKind::Missing);
        assert_eq!(result.errors()[0].subject, "html");

        let result = run(&validator, "<html lang=\"en\"><head></head><body>");
        assert_eq!(result.errors()[0].kind, FindingKind::Malformed);

        let result = run(&validator, "<html><html></html>");
        assert_eq!(result.errors()[0].kind, FindingKind::NotUnique);

        let result = run(
            &validator,
            "junk<html lang=\"en\"><head></head><body></body></html>",
        );
        assert_eq!(result.errors()[0].kind, FindingKind::Structural);

        let result = run(
            &validator,
            "<html lang=\"en\"><head></head><body></body></html>trailing",
        );
        assert_eq!(result.errors()[0].kind, FindingKind::Structural);
    }

    #[test]
    fn test_html_requires_single_body_after_head() {
        let validator = HtmlValidator::new();

        // A missing head is left to the head validator
        let result = run(&validator, "<html lang=\"en\"><body></body></html>");
        assert!(result.is_valid());

        let result = run(&validator, "<html lang=\"en\"><head></head></html>");
        assert_eq!(result.errors()[0].kind, FindingKind::Missing);
        assert_eq!(result.errors()[0].subject, "body");

        let result = run(
            &validator,
            "<html lang=\"en\"><head></head><body></body><body></body></html>",
        );
        assert_eq!(result.errors()[0].kind, FindingKind::NotUnique);
        assert_eq!(result.errors()[0].subject, "body");

        let result = run(&validator, "<html lang=\"en\"><body></body><head></head></html>");
        assert_eq!(result.errors()[0].kind, FindingKind::Structural);
    }

    #[test]
    fn test_html_lang_warning() {
        let validator = HtmlValidator::new();
        let result = run(
            &validator,
            "<!DOCTYPE html>\n<html><head></head><body></body></html>\n",
        );
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].kind, FindingKind::RecommendedAttribute);

        let result = run(&validator, "<html lang=\"\"><head></head><body></body></html>");
        assert_eq!(result.warnings().len(), 1);

        let result = run(&validator, "<html lang=\"fr\"><head></head><body></body></html>");
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_head_rules() {
        let validator = HeadValidator::new();
        assert!(run(&validator, "<html>\n  <head></head></html>").is_valid());

        let result = run(&validator, "<head></head><head></head>");
        assert_eq!(result.errors()[0].kind, FindingKind::NotUnique);

        let result = run(&validator, "<html><meta charset=\"utf-8\"><head></head></html>");
        assert_eq!(result.errors()[0].kind, FindingKind::Structural);

        let result = run(&validator, "<html><head><title>x</title></html>");
        assert_eq!(result.errors()[0].kind, FindingKind::Malformed);

        let result = run(&validator, "<html><head><body></body></head></html>");
        assert_eq!(result.errors()[0].kind, FindingKind::Structural);
        assert!(result.errors()[0].message().contains("<body>"));
    }

    #[test]
    fn test_head_missing_is_reported_regardless_of_html_state() {
        let validator = HeadValidator::new();
        for source in [
            "<html><body></body></html>",
            "<body><p>Hi</p></body>",
            "<html lang=\"en\"><body><p>Hi</p></body>",
            "junk<html lang=\"en\"><body></body></html>",
        ] {
            let result = run(&validator, source);
            assert_eq!(result.errors().len(), 1, "{}", source);
            assert_eq!(result.errors()[0].kind, FindingKind::Missing);
            assert_eq!(result.errors()[0].subject, "head");
        }
    }

    #[test]
    fn test_body_rules() {
        let validator = BodyValidator::new();
        assert!(run(&validator, "<body><p>x</p></body>").warnings().is_empty());

        let result = run(&validator, "<body></body><body></body>");
        assert_eq!(result.errors()[0].kind, FindingKind::NotUnique);

        let result = run(&validator, "<body><meta charset=\"UTF-8\"><p>x</p></body>");
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].kind, FindingKind::InvalidContent);
        assert!(result.errors()[0].message().contains("meta"));

        let result = run(&validator, "<body><!DOCTYPE html></body>");
        assert_eq!(result.errors()[0].kind, FindingKind::InvalidContent);

        let result = run(&validator, "<body bgcolor=\"red\"><p>x</p></body>");
        assert_eq!(result.errors()[0].kind, FindingKind::Malformed);
        assert!(result.errors()[0].message().contains("bgcolor"));

        let result = run(&validator, "<body>  <!-- nothing --> </body>");
        assert!(result.is_valid());
        assert_eq!(result.warnings()[0].kind, FindingKind::Empty);
    }
}
