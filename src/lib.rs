//! Markup Lint
//!
//! Structural validation of HTML fragments against a fixed element grammar,
//! and extraction of a labeled content tree for downstream rendering.

pub mod document;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod markup;
pub mod registry;
pub mod validation;

pub use document::{DocumentContext, InputKind};
pub use engine::{extract, validate, Engine, Report};
pub use error::ConfigurationError;
pub use extraction::{ElementExtractor, ExtractorChain, Node};
pub use registry::{Capability, ComponentKind, ComponentRegistry, RegistryEntry};
pub use validation::{
    ElementValidator, Finding, FindingKind, ValidationResult, ValidatorChain,
};
