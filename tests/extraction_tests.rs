//! Content tree extraction over the built-in component registry.

use markup_lint::{extract, validate, ComponentRegistry, DocumentContext, Engine, InputKind, Node};
use markup_lint::markup::{pair_elements, scan_tags};

const ARTICLE: &str = r#"<!DOCTYPE html>
<html lang="en" dir="ltr">
<head>
  <title>
    Release Notes
  </title>
</head>
<body id="main">
  <h1>Release 2.0</h1>
  <p>  Faster <strong>builds</strong>.  </p>
  <h2>Fixes</h2>
  <p class="small">Many.</p>
</body>
</html>"#;

#[test]
fn test_valid_document_yields_single_html_root() {
    assert!(validate(ARTICLE, InputKind::Html).is_valid());

    let tree = extract(ARTICLE, InputKind::Html);
    assert_eq!(tree.len(), 1);

    let html = &tree[0];
    assert_eq!(html.tag_name, "html");
    let attributes: Vec<(&str, &str)> = html
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(attributes, vec![("lang", "en"), ("dir", "ltr")]);

    let head = &html.children[0];
    let body = &html.children[1];
    assert_eq!(head.tag_name, "head");
    assert_eq!(head.children[0].content.as_deref(), Some("Release Notes"));
    assert_eq!(body.attributes["id"], "main");

    let order: Vec<&str> = body.children.iter().map(|c| c.tag_name.as_str()).collect();
    assert_eq!(order, vec!["p", "p", "h1", "h2"]);
}

#[test]
fn test_leaf_content_matches_trimmed_source_span() {
    let tree = extract(ARTICLE, InputKind::Html);
    let tags = scan_tags(ARTICLE);

    let leaves: Vec<&Node> = tree.iter().flat_map(|node| node.leaves()).collect();
    assert_eq!(leaves.len(), 5);

    for leaf in leaves {
        assert!(leaf.children.is_empty());
        let content = leaf.content.as_deref().unwrap();
        let expected: Vec<String> = pair_elements(&tags, &leaf.tag_name)
            .iter()
            .map(|element| element.inner(ARTICLE).trim().to_string())
            .collect();
        assert!(
            expected.iter().any(|span| span == content),
            "{:?} not found among {:?}",
            content,
            expected
        );
    }
}

#[test]
fn test_extraction_ignores_validator_only_violations() {
    let source = r#"<body><meta charset="UTF-8"><p>x</p></body>"#;
    assert!(!validate(source, InputKind::Html).is_valid());

    let tree = extract(source, InputKind::Html);
    let paragraph = tree[0].find("p").expect("paragraph node");
    assert_eq!(paragraph.content.as_deref(), Some("x"));
}

#[test]
fn test_unmatched_document_yields_empty_forest() {
    assert!(extract("just some text", InputKind::Html).is_empty());
}

#[test]
fn test_root_extractors_concatenate_in_configured_order() {
    let mut registry = ComponentRegistry::default();
    registry.html.extractors = vec!["heading".to_string(), "title".to_string()];
    let engine = Engine::new(&registry).unwrap();

    let tree = engine.extract(&DocumentContext::new(ARTICLE), InputKind::Html);
    let summary: Vec<(&str, &str)> = tree
        .iter()
        .map(|n| (n.tag_name.as_str(), n.content.as_deref().unwrap_or("")))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("h1", "Release 2.0"),
            ("h2", "Fixes"),
            ("title", "Release Notes"),
        ]
    );
}

#[test]
fn test_markdown_extraction_wraps_source() {
    let tree = extract("Plain *markdown*", InputKind::Markdown);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].tag_name, "markdown");
    assert_eq!(tree[0].content.as_deref(), Some("Plain *markdown*"));
}

#[test]
fn test_tree_serializes_to_json() {
    let tree = extract("<body><p id=\"a\">x</p></body>", InputKind::Html);
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json[0]["tag_name"], "body");
    assert_eq!(json[0]["content"], serde_json::Value::Null);
    assert_eq!(json[0]["children"][0]["attributes"]["id"], "a");
}
