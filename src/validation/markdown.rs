//! Markdown validation
//!
//! Markdown input is accepted as-is. The validator exists so Markdown can be
//! configured through the registry like any other input kind.

use super::{ElementValidator, ValidationResult};
use crate::document::DocumentContext;

#[derive(Default)]
pub struct MarkdownValidator;

impl MarkdownValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ElementValidator for MarkdownValidator {
    fn name(&self) -> &str {
        "markdown"
    }

    fn validate(&self, _context: &DocumentContext) -> ValidationResult {
        ValidationResult::new()
    }
}
