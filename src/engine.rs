//! Validation and extraction entry points

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::{debug, info};
use serde::Serialize;

use crate::document::{DocumentContext, InputKind};
use crate::error::Result;
use crate::extraction::{ExtractorChain, Node};
use crate::registry::ComponentRegistry;
use crate::validation::{ValidationResult, ValidatorChain};

lazy_static! {
    /// Engine over the built-in registry, shared read-only by every request
    static ref DEFAULT_ENGINE: Engine =
        Engine::new(&ComponentRegistry::default()).expect("built-in component registry is valid");
}

/// Outcome of validating and, when valid, extracting one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub input_kind: InputKind,
    pub validation: ValidationResult,
    pub tree: Option<Vec<Node>>,
}

/// Resolved validator and extractor chains for every input kind.
///
/// Resolution happens once in [`Engine::new`]; running the chains never
/// fails afterwards.
#[derive(Debug)]
pub struct Engine {
    validators: HashMap<InputKind, ValidatorChain>,
    extractors: HashMap<InputKind, ExtractorChain>,
}

impl Engine {
    pub fn new(registry: &ComponentRegistry) -> Result<Self> {
        let mut validators = HashMap::new();
        let mut extractors = HashMap::new();

        for kind in InputKind::ALL {
            validators.insert(kind, ValidatorChain::from_registry(registry, kind)?);
            extractors.insert(kind, ExtractorChain::from_registry(registry, kind)?);
        }

        info!("Engine ready for {} input kinds", InputKind::ALL.len());
        Ok(Self {
            validators,
            extractors,
        })
    }

    /// Engine built from the built-in registry
    pub fn default_engine() -> &'static Engine {
        &DEFAULT_ENGINE
    }

    pub fn validator_chain(&self, input_kind: InputKind) -> &ValidatorChain {
        &self.validators[&input_kind]
    }

    pub fn extractor_chain(&self, input_kind: InputKind) -> &ExtractorChain {
        &self.extractors[&input_kind]
    }

    pub fn validate(&self, context: &DocumentContext, input_kind: InputKind) -> ValidationResult {
        let result = self.validator_chain(input_kind).run(context);
        debug!(
            "Validated {} bytes of {} input: valid={}, {} errors, {} warnings",
            context.source().len(),
            input_kind,
            result.is_valid(),
            result.errors().len(),
            result.warnings().len()
        );
        result
    }

    pub fn extract(&self, context: &DocumentContext, input_kind: InputKind) -> Vec<Node> {
        self.extractor_chain(input_kind).run(context)
    }

    /// Validate, then extract only if the document is valid
    pub fn process(&self, context: &DocumentContext, input_kind: InputKind) -> Report {
        let validation = self.validate(context, input_kind);
        let tree = if validation.is_valid() {
            Some(self.extract(context, input_kind))
        } else {
            None
        };

        Report {
            input_kind,
            validation,
            tree,
        }
    }
}

/// Validate `source` with the built-in registry
pub fn validate(source: &str, input_kind: InputKind) -> ValidationResult {
    DEFAULT_ENGINE.validate(&DocumentContext::new(source), input_kind)
}

/// Extract the content tree of `source` with the built-in registry
pub fn extract(source: &str, input_kind: InputKind) -> Vec<Node> {
    DEFAULT_ENGINE.extract(&DocumentContext::new(source), input_kind)
}
