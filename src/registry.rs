//! Component registry
//!
//! The set of validators and extractors is closed and known at compile time.
//! Configuration only chooses which of them run for an input kind and in
//! which order. Lists are checked when the registry is loaded and again when
//! an orchestrator resolves them; any defect is a fatal
//! [`ConfigurationError`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use lazy_static::lazy_static;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::document::InputKind;
use crate::error::{ConfigurationError, Result};
use crate::extraction::{self, ElementExtractor};
use crate::validation::{self, ElementValidator};

/// Prefix of environment variables overriding registry lists
pub const ENV_PREFIX: &str = "MARKUP_LINT";

/// Every component the crate ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Doctype,
    Html,
    Head,
    Body,
    Title,
    Heading,
    Paragraph,
    Anchor,
    Markdown,
}

lazy_static! {
    /// Identifier lookup table, aliases included
    static ref IDENTIFIERS: HashMap<&'static str, ComponentKind> = {
        let mut table = HashMap::new();
        for kind in ComponentKind::ALL {
            table.insert(kind.identifier(), kind);
        }
        table.insert("p", ComponentKind::Paragraph);
        table.insert("a", ComponentKind::Anchor);
        table.insert("md", ComponentKind::Markdown);
        table
    };
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::Doctype,
        ComponentKind::Html,
        ComponentKind::Head,
        ComponentKind::Body,
        ComponentKind::Title,
        ComponentKind::Heading,
        ComponentKind::Paragraph,
        ComponentKind::Anchor,
        ComponentKind::Markdown,
    ];

    /// Canonical identifier used in configuration files
    pub fn identifier(&self) -> &'static str {
        match self {
            ComponentKind::Doctype => "doctype",
            ComponentKind::Html => "html",
            ComponentKind::Head => "head",
            ComponentKind::Body => "body",
            ComponentKind::Title => "title",
            ComponentKind::Heading => "heading",
            ComponentKind::Paragraph => "paragraph",
            ComponentKind::Anchor => "anchor",
            ComponentKind::Markdown => "markdown",
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Validator => true,
            Capability::Extractor => !matches!(self, ComponentKind::Doctype | ComponentKind::Anchor),
        }
    }

    /// Instantiate the validator for this component
    pub fn validator(&self) -> Option<Box<dyn ElementValidator>> {
        let validator: Box<dyn ElementValidator> = match self {
            ComponentKind::Doctype => Box::new(validation::DoctypeValidator::new()),
            ComponentKind::Html => Box::new(validation::HtmlValidator::new()),
            ComponentKind::Head => Box::new(validation::HeadValidator::new()),
            ComponentKind::Body => Box::new(validation::BodyValidator::new()),
            ComponentKind::Title => Box::new(validation::TitleValidator::new()),
            ComponentKind::Heading => Box::new(validation::HeadingValidator::new()),
            ComponentKind::Paragraph => Box::new(validation::ParagraphValidator::new()),
            ComponentKind::Anchor => Box::new(validation::AnchorValidator::new()),
            ComponentKind::Markdown => Box::new(validation::MarkdownValidator::new()),
        };
        Some(validator)
    }

    /// Instantiate the extractor for this component, if it has one
    pub fn extractor(&self) -> Option<Box<dyn ElementExtractor>> {
        match self {
            ComponentKind::Html => Some(Box::new(extraction::HtmlExtractor::new())),
            ComponentKind::Head => Some(Box::new(extraction::HeadExtractor::new())),
            ComponentKind::Body => Some(Box::new(extraction::BodyExtractor::new())),
            ComponentKind::Title => Some(Box::new(extraction::TitleExtractor::new())),
            ComponentKind::Heading => Some(Box::new(extraction::HeadingExtractor::new())),
            ComponentKind::Paragraph => Some(Box::new(extraction::ParagraphExtractor::new())),
            ComponentKind::Markdown => Some(Box::new(extraction::MarkdownExtractor::new())),
            ComponentKind::Doctype | ComponentKind::Anchor => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        IDENTIFIERS
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| format!("unknown component '{}'", s))
    }
}

/// What a component is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Validator,
    Extractor,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Validator => write!(f, "validator"),
            Capability::Extractor => write!(f, "extractor"),
        }
    }
}

/// Ordered component identifiers for one input kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(default)]
    pub validators: Vec<String>,
    #[serde(default)]
    pub extractors: Vec<String>,
}

impl RegistryEntry {
    pub fn new(validators: &[&str], extractors: &[&str]) -> Self {
        Self {
            validators: validators.iter().map(|s| s.to_string()).collect(),
            extractors: extractors.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn identifiers(&self, capability: Capability) -> &[String] {
        match capability {
            Capability::Validator => &self.validators,
            Capability::Extractor => &self.extractors,
        }
    }
}

/// Declarative component lists per input kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRegistry {
    #[serde(default)]
    pub html: RegistryEntry,
    #[serde(default)]
    pub markdown: RegistryEntry,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self {
            html: RegistryEntry::new(
                &["html", "head", "body", "title", "heading", "paragraph", "anchor"],
                &["html"],
            ),
            markdown: RegistryEntry::new(&["markdown"], &["markdown"]),
        }
    }
}

impl ComponentRegistry {
    /// Load a registry file (format chosen by extension) with environment
    /// overrides such as `MARKUP_LINT_HTML__VALIDATORS=html,body`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading component registry from {}", path.display());
        Self::from_builder(Config::builder().add_source(File::from(path)))
    }

    /// Parse a TOML registry, applying the same checks as [`load`](Self::load)
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::from_builder(
            Config::builder().add_source(File::from_str(contents, FileFormat::Toml)),
        )
    }

    fn from_builder(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let mut environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .try_parsing(true);
        for kind in InputKind::ALL {
            for capability in [Capability::Validator, Capability::Extractor] {
                environment = environment.with_list_parse_key(&format!("{}.{}s", kind, capability));
            }
        }

        let registry: ComponentRegistry = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        registry.check()?;
        Ok(registry)
    }

    pub fn entry(&self, input_kind: InputKind) -> &RegistryEntry {
        match input_kind {
            InputKind::Html => &self.html,
            InputKind::Markdown => &self.markdown,
        }
    }

    /// Resolve every list, failing on the first defect
    pub fn check(&self) -> Result<()> {
        for kind in InputKind::ALL {
            self.resolve(kind, Capability::Validator)?;
            self.resolve(kind, Capability::Extractor)?;
        }
        Ok(())
    }

    /// Ordered components for an input kind and capability
    pub fn resolve(&self, input_kind: InputKind, capability: Capability) -> Result<Vec<ComponentKind>> {
        let identifiers = self.entry(input_kind).identifiers(capability);
        if identifiers.is_empty() {
            return Err(ConfigurationError::EmptyComponentList {
                input_kind,
                capability,
            });
        }

        let mut resolved: Vec<ComponentKind> = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            let kind: ComponentKind =
                identifier
                    .parse()
                    .map_err(|_| ConfigurationError::UnknownComponent {
                        input_kind,
                        identifier: identifier.clone(),
                    })?;

            if !kind.supports(capability) {
                return Err(ConfigurationError::WrongCapability {
                    input_kind,
                    capability,
                    identifier: identifier.clone(),
                });
            }
            if resolved.contains(&kind) {
                return Err(ConfigurationError::DuplicateComponent {
                    input_kind,
                    capability,
                    identifier: identifier.clone(),
                });
            }
            resolved.push(kind);
        }

        debug!("Resolved {} {}s for {} input", resolved.len(), capability, input_kind);
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_is_valid() {
        let registry = ComponentRegistry::default();
        assert!(registry.check().is_ok());
        assert_eq!(
            registry.resolve(InputKind::Html, Capability::Extractor).unwrap(),
            vec![ComponentKind::Html]
        );
    }

    #[test]
    fn test_identifier_lookup() {
        assert_eq!("Paragraph".parse::<ComponentKind>().unwrap(), ComponentKind::Paragraph);
        assert_eq!(" p ".parse::<ComponentKind>().unwrap(), ComponentKind::Paragraph);
        assert_eq!("a".parse::<ComponentKind>().unwrap(), ComponentKind::Anchor);
        assert!("table".parse::<ComponentKind>().is_err());
        for kind in ComponentKind::ALL {
            assert_eq!(kind.identifier().parse::<ComponentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_capabilities_match_instantiation() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.validator().is_some(), kind.supports(Capability::Validator));
            assert_eq!(kind.extractor().is_some(), kind.supports(Capability::Extractor));
        }
    }

    #[test]
    fn test_resolve_preserves_configured_order() {
        let mut registry = ComponentRegistry::default();
        registry.html = RegistryEntry::new(&["title", "doctype", "html"], &["body", "head"]);
        assert_eq!(
            registry.resolve(InputKind::Html, Capability::Validator).unwrap(),
            vec![ComponentKind::Title, ComponentKind::Doctype, ComponentKind::Html]
        );
        assert_eq!(
            registry.resolve(InputKind::Html, Capability::Extractor).unwrap(),
            vec![ComponentKind::Body, ComponentKind::Head]
        );
    }

    #[test]
    fn test_resolve_rejects_defects() {
        let mut registry = ComponentRegistry::default();

        registry.html = RegistryEntry::new(&[], &["html"]);
        assert!(matches!(
            registry.resolve(InputKind::Html, Capability::Validator),
            Err(ConfigurationError::EmptyComponentList { .. })
        ));

        registry.html = RegistryEntry::new(&["paragraph", "p"], &["html"]);
        assert!(matches!(
            registry.resolve(InputKind::Html, Capability::Validator),
            Err(ConfigurationError::DuplicateComponent { .. })
        ));

        registry.html = RegistryEntry::new(&["html", "table"], &["html"]);
        assert!(matches!(
            registry.resolve(InputKind::Html, Capability::Validator),
            Err(ConfigurationError::UnknownComponent { ref identifier, .. }) if identifier == "table"
        ));

        registry.html = RegistryEntry::new(&["html"], &["anchor"]);
        assert!(matches!(
            registry.resolve(InputKind::Html, Capability::Extractor),
            Err(ConfigurationError::WrongCapability { .. })
        ));
    }
}
