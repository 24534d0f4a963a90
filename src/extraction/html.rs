//! Extractors for HTML documents

use super::{attribute_map, ElementExtractor, Node};
use crate::markup::{self, Element, HEADING_TAGS};

/// First element named `name` in `scope`, closed or not
fn first_element(scope: &str, name: &str) -> Option<Element> {
    let tags = markup::scan_tags(scope);
    markup::pair_elements(&tags, name).into_iter().next()
}

/// Leaf nodes for every closed element with one of `names`, in document order
fn leaf_nodes(scope: &str, names: &[&str]) -> Vec<Node> {
    let tags = markup::scan_tags(scope);
    let mut elements: Vec<Element> = names
        .iter()
        .flat_map(|name| markup::pair_elements(&tags, name))
        .filter(Element::is_closed)
        .collect();
    elements.sort_by_key(|element| element.open.start);

    elements
        .iter()
        .map(|element| {
            Node::leaf(
                element.open.name.as_str(),
                element.inner(scope).trim(),
                attribute_map(&element.open),
            )
        })
        .collect()
}

/// Root extractor: `<html>` with its head and body.
///
/// A fragment without an `<html>` element yields its head and body nodes
/// directly as roots.
#[derive(Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    fn children(scope: &str) -> Vec<Node> {
        let mut children = HeadExtractor::new().extract(scope);
        children.extend(BodyExtractor::new().extract(scope));
        children
    }
}

impl ElementExtractor for HtmlExtractor {
    fn name(&self) -> &str {
        "html"
    }

    fn extract(&self, scope: &str) -> Vec<Node> {
        match first_element(scope, "html") {
            Some(html) => vec![Node::container(
                "html",
                attribute_map(&html.open),
                Self::children(html.inner(scope)),
            )],
            None => Self::children(scope),
        }
    }
}

#[derive(Default)]
pub struct HeadExtractor;

impl HeadExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ElementExtractor for HeadExtractor {
    fn name(&self) -> &str {
        "head"
    }

    fn extract(&self, scope: &str) -> Vec<Node> {
        first_element(scope, "head")
            .map(|head| {
                Node::container(
                    "head",
                    attribute_map(&head.open),
                    TitleExtractor::new().extract(head.inner(scope)),
                )
            })
            .into_iter()
            .collect()
    }
}

/// Body with its paragraphs first, then its headings
#[derive(Default)]
pub struct BodyExtractor;

impl BodyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ElementExtractor for BodyExtractor {
    fn name(&self) -> &str {
        "body"
    }

    fn extract(&self, scope: &str) -> Vec<Node> {
        let body = match first_element(scope, "body") {
            Some(body) => body,
            None => return Vec::new(),
        };
        let inner = body.inner(scope);

        let mut children = ParagraphExtractor::new().extract(inner);
        children.extend(HeadingExtractor::new().extract(inner));

        vec![Node::container("body", attribute_map(&body.open), children)]
    }
}

#[derive(Default)]
pub struct TitleExtractor;

impl TitleExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ElementExtractor for TitleExtractor {
    fn name(&self) -> &str {
        "title"
    }

    fn extract(&self, scope: &str) -> Vec<Node> {
        leaf_nodes(scope, &["title"]).into_iter().take(1).collect()
    }
}

#[derive(Default)]
pub struct HeadingExtractor;

impl HeadingExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ElementExtractor for HeadingExtractor {
    fn name(&self) -> &str {
        "heading"
    }

    fn extract(&self, scope: &str) -> Vec<Node> {
        leaf_nodes(scope, HEADING_TAGS)
    }
}

#[derive(Default)]
pub struct ParagraphExtractor;

impl ParagraphExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ElementExtractor for ParagraphExtractor {
    fn name(&self) -> &str {
        "p"
    }

    fn extract(&self, scope: &str) -> Vec<Node> {
        leaf_nodes(scope, &["p"])
    }
}
