//! Markdown extraction: the whole source becomes one leaf node

use indexmap::IndexMap;

use super::{ElementExtractor, Node};

#[derive(Default)]
pub struct MarkdownExtractor;

impl MarkdownExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ElementExtractor for MarkdownExtractor {
    fn name(&self) -> &str {
        "markdown"
    }

    fn extract(&self, scope: &str) -> Vec<Node> {
        vec![Node::leaf("markdown", scope, IndexMap::new())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_wraps_raw_source() {
        let source = "# Title\n\nSome *text*.\n";
        let nodes = MarkdownExtractor::new().extract(source);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag_name, "markdown");
        assert_eq!(nodes[0].content.as_deref(), Some(source));
        assert!(nodes[0].children.is_empty());
    }
}
