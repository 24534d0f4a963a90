//! Document context shared by every validator and extractor

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::markup::{self, Tag};

/// Declared kind of the submitted source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Html,
    Markdown,
}

impl InputKind {
    pub const ALL: [InputKind; 2] = [InputKind::Html, InputKind::Markdown];

    /// Guess the input kind from a file extension, defaulting to HTML
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") | Some("markdown") => InputKind::Markdown,
            _ => InputKind::Html,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Html => write!(f, "html"),
            InputKind::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(InputKind::Html),
            "markdown" | "md" => Ok(InputKind::Markdown),
            other => Err(format!("unsupported input kind '{}'", other)),
        }
    }
}

/// Immutable holder of the raw source text.
///
/// The tag stream is scanned once at construction so that validators do not
/// each re-tokenize the whole document.
#[derive(Debug)]
pub struct DocumentContext {
    source: String,
    tags: Vec<Tag>,
}

impl DocumentContext {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let tags = markup::scan_tags(&source);
        Self { source, tags }
    }

    /// Build a context from raw bytes; invalid UTF-8 sequences become U+FFFD
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// All tags of the document in source order, comments excluded
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Tags with the given (lowercase) name
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |tag| tag.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind_parsing() {
        assert_eq!("HTML".parse::<InputKind>().unwrap(), InputKind::Html);
        assert_eq!(" md ".parse::<InputKind>().unwrap(), InputKind::Markdown);
        assert!("rst".parse::<InputKind>().is_err());
    }

    #[test]
    fn test_input_kind_from_path() {
        assert_eq!(InputKind::from_path(Path::new("README.md")), InputKind::Markdown);
        assert_eq!(InputKind::from_path(Path::new("index.html")), InputKind::Html);
        assert_eq!(InputKind::from_path(Path::new("noext")), InputKind::Html);
    }

    #[test]
    fn test_context_scans_tags_once() {
        let context = DocumentContext::new("<p>a</p><!-- <p> --><p>b</p>");
        assert_eq!(context.tags().len(), 4);
        assert_eq!(context.tags_named("p").count(), 4);
    }

    #[test]
    fn test_from_bytes_replaces_invalid_sequences() {
        let context = DocumentContext::from_bytes(b"<title>a\xffb</title>");
        assert!(context.source().contains('\u{FFFD}'));
    }
}
