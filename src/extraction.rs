//! Content tree extraction
//!
//! Extractors locate an element's span, read its attributes and recurse
//! into the extractors of its expected children. An element that cannot be
//! found yields no node; reporting that is the validators' job.

pub mod html;
pub mod markdown;

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::document::{DocumentContext, InputKind};
use crate::error::Result;
use crate::markup::Tag;
use crate::registry::{Capability, ComponentKind, ComponentRegistry};

pub use html::{
    BodyExtractor, HeadExtractor, HeadingExtractor, HtmlExtractor, ParagraphExtractor,
    TitleExtractor,
};
pub use markdown::MarkdownExtractor;

/// One extracted element.
///
/// Container nodes carry children and no content; leaf nodes carry content
/// and no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Lowercase tag name, or `markdown` for the Markdown leaf
    pub tag_name: String,
    /// Leaf text: trimmed inner markup, or the raw Markdown source
    pub content: Option<String>,
    /// Attributes of the opening tag in source order
    pub attributes: IndexMap<String, String>,
    /// Child nodes in extraction order; empty on leaves
    pub children: Vec<Node>,
}

impl Node {
    pub fn container(
        tag_name: impl Into<String>,
        attributes: IndexMap<String, String>,
        children: Vec<Node>,
    ) -> Self {
        Self {
            tag_name: tag_name.into(),
            content: None,
            attributes,
            children,
        }
    }

    pub fn leaf(
        tag_name: impl Into<String>,
        content: impl Into<String>,
        attributes: IndexMap<String, String>,
    ) -> Self {
        Self {
            tag_name: tag_name.into(),
            content: Some(content.into()),
            attributes,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.content.is_some()
    }

    /// Depth-first search for the first node with this tag name
    pub fn find(&self, tag_name: &str) -> Option<&Node> {
        if self.tag_name == tag_name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(tag_name))
    }

    /// Leaf nodes in document-tree order
    pub fn leaves(&self) -> Vec<&Node> {
        if self.children.is_empty() {
            return vec![self];
        }
        self.children.iter().flat_map(|child| child.leaves()).collect()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(node: &Node, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}<{}", "  ".repeat(depth), node.tag_name)?;
            for (name, value) in &node.attributes {
                write!(f, " {}=\"{}\"", name, value)?;
            }
            write!(f, ">")?;
            if let Some(content) = &node.content {
                write!(f, " {}", content)?;
            }
            writeln!(f)?;
            for child in &node.children {
                write_node(child, depth + 1, f)?;
            }
            Ok(())
        }
        write_node(self, 0, f)
    }
}

/// Attributes of a tag as an ordered map; the first occurrence of a name wins
pub fn attribute_map(tag: &Tag) -> IndexMap<String, String> {
    let mut attributes = IndexMap::new();
    for attribute in tag.attributes() {
        attributes
            .entry(attribute.name)
            .or_insert_with(|| attribute.value.unwrap_or_default());
    }
    attributes
}

/// Builds content nodes for one element kind from a span of markup
pub trait ElementExtractor: Send + Sync {
    /// Name of the element this extractor produces
    fn name(&self) -> &str;

    /// Extract every matching element found in `scope`
    fn extract(&self, scope: &str) -> Vec<Node>;
}

/// Ordered set of root extractors resolved from the component registry
pub struct ExtractorChain {
    input_kind: InputKind,
    extractors: Vec<(ComponentKind, Box<dyn ElementExtractor>)>,
}

impl fmt::Debug for ExtractorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorChain")
            .field("input_kind", &self.input_kind)
            .field("components", &self.components())
            .finish()
    }
}

impl ExtractorChain {
    /// Resolve and instantiate the root extractors configured for `input_kind`
    pub fn from_registry(registry: &ComponentRegistry, input_kind: InputKind) -> Result<Self> {
        let kinds = registry.resolve(input_kind, Capability::Extractor)?;
        let extractors = kinds
            .into_iter()
            .filter_map(|kind| kind.extractor().map(|extractor| (kind, extractor)))
            .collect::<Vec<_>>();

        debug!(
            "Resolved {} root extractors for {} input",
            extractors.len(),
            input_kind
        );

        Ok(Self {
            input_kind,
            extractors,
        })
    }

    pub fn components(&self) -> Vec<ComponentKind> {
        self.extractors.iter().map(|(kind, _)| *kind).collect()
    }

    /// Run every root extractor and concatenate their nodes in order
    pub fn run(&self, context: &DocumentContext) -> Vec<Node> {
        let mut tree = Vec::new();
        for (kind, extractor) in &self.extractors {
            let nodes = extractor.extract(context.source());
            debug!("Extractor '{}' produced {} root nodes", kind, nodes.len());
            tree.extend(nodes);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::scan_tags;

    #[test]
    fn test_node_shapes() {
        let leaf = Node::leaf("p", "Hello", IndexMap::new());
        assert!(leaf.is_leaf());

        let body = Node::container("body", IndexMap::new(), vec![leaf.clone()]);
        assert!(!body.is_leaf());
        assert!(body.content.is_none());
        assert_eq!(body.find("p"), Some(&leaf));
        assert_eq!(body.leaves(), vec![&leaf]);
    }

    #[test]
    fn test_attribute_map_keeps_order_and_first_value() {
        let tags = scan_tags(r#"<p id="a" class="b" ID="c" hidden>"#);
        let attributes = attribute_map(&tags[0]);
        let keys: Vec<&str> = attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "class", "hidden"]);
        assert_eq!(attributes["id"], "a");
        assert_eq!(attributes["hidden"], "");
    }

    #[test]
    fn test_node_display() {
        let mut attributes = IndexMap::new();
        attributes.insert("lang".to_string(), "en".to_string());
        let tree = Node::container(
            "html",
            attributes,
            vec![Node::leaf("title", "Home", IndexMap::new())],
        );
        assert_eq!(tree.to_string(), "<html lang=\"en\">\n  <title> Home\n");
    }

    #[test]
    fn test_node_serializes_in_attribute_order() {
        let mut attributes = IndexMap::new();
        attributes.insert("b".to_string(), "1".to_string());
        attributes.insert("a".to_string(), "2".to_string());
        let json = serde_json::to_string(&Node::leaf("p", "x", attributes)).unwrap();
        assert_eq!(
            json,
            r#"{"tag_name":"p","content":"x","attributes":{"b":"1","a":"2"},"children":[]}"#
        );
    }
}
