//! Element validation system
//!
//! Every structural element of the document grammar has one validator. A
//! validator runs its checks in a fixed order and stops at the first error
//! it records. The [`ValidatorChain`] runs all configured validators against
//! the same [`DocumentContext`] and merges their results, never stopping
//! early across validators.

pub mod content;
pub mod markdown;
pub mod structure;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::document::{DocumentContext, InputKind};
use crate::error::Result;
use crate::registry::{Capability, ComponentKind, ComponentRegistry};

pub use content::{AnchorValidator, HeadingValidator, ParagraphValidator, TitleValidator};
pub use markdown::MarkdownValidator;
pub use structure::{BodyValidator, DoctypeValidator, HeadValidator, HtmlValidator};

/// Category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Missing,
    NotUnique,
    Malformed,
    Structural,
    InvalidContent,
    Empty,
    Unsupported,
    Internal,
    RecommendedAttribute,
}

impl FindingKind {
    /// Message template; `{}` is replaced by the subject
    fn template(&self) -> &'static str {
        match self {
            FindingKind::Missing => "Missing required element <{}>",
            FindingKind::NotUnique => "Element <{}> must appear only once",
            FindingKind::Malformed => "Malformed <{}>",
            FindingKind::Structural => "Invalid document structure around <{}>",
            FindingKind::InvalidContent => "Invalid content in <{}>",
            FindingKind::Empty => "Element <{}> is empty",
            FindingKind::Unsupported => "Unsupported construct <{}>",
            FindingKind::Internal => "Internal failure while checking <{}>",
            FindingKind::RecommendedAttribute => "Recommended attribute '{}' is missing",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingKind::Missing => "missing",
            FindingKind::NotUnique => "not_unique",
            FindingKind::Malformed => "malformed",
            FindingKind::Structural => "structural",
            FindingKind::InvalidContent => "invalid_content",
            FindingKind::Empty => "empty",
            FindingKind::Unsupported => "unsupported",
            FindingKind::Internal => "internal",
            FindingKind::RecommendedAttribute => "recommended_attribute",
        };
        write!(f, "{}", name)
    }
}

/// An error or warning reported by a validator.
///
/// The subject is the element or attribute name the finding is about; the
/// optional detail narrows down what exactly was wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Category that selects the message template
    pub kind: FindingKind,
    /// Element or attribute the finding is about
    pub subject: String,
    /// Extra context appended to the rendered message
    pub detail: Option<String>,
}

impl Finding {
    pub fn new(kind: FindingKind, subject: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn missing(subject: impl Into<String>) -> Self {
        Self::new(FindingKind::Missing, subject)
    }

    pub fn not_unique(subject: impl Into<String>) -> Self {
        Self::new(FindingKind::NotUnique, subject)
    }

    pub fn malformed(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(FindingKind::Malformed, subject).with_detail(detail)
    }

    pub fn structural(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(FindingKind::Structural, subject).with_detail(detail)
    }

    pub fn invalid_content(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(FindingKind::InvalidContent, subject).with_detail(detail)
    }

    pub fn empty(subject: impl Into<String>) -> Self {
        Self::new(FindingKind::Empty, subject)
    }

    pub fn recommended_attribute(attribute: impl Into<String>) -> Self {
        Self::new(FindingKind::RecommendedAttribute, attribute)
    }

    /// Human-readable message built from the kind's template
    pub fn message(&self) -> String {
        let head = self.kind.template().replace("{}", &self.subject);
        match &self.detail {
            Some(detail) => format!("{}: {}", head, detail),
            None => head,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message())
    }
}

impl Serialize for Finding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Finding", 4)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("subject", &self.subject)?;
        state.serialize_field("detail", &self.detail)?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// Accumulated outcome of one or more validators.
///
/// `valid` is kept equal to `errors.is_empty()`; warnings never affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record an error; the result becomes invalid
    pub fn set_error(&mut self, error: Finding) {
        self.valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: Finding) {
        self.warnings.push(warning);
    }

    /// Append another result's findings after our own
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.errors.is_empty() {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    /// Shorthand used by validators to fail with a single error
    pub fn failed(error: Finding) -> Self {
        let mut result = Self::new();
        result.set_error(error);
        result
    }
}

/// Checks one structural element of a document
pub trait ElementValidator: Send + Sync {
    /// Name of the element this validator is responsible for
    fn name(&self) -> &str;

    /// Run all checks against the document, stopping at the first error
    fn validate(&self, context: &DocumentContext) -> ValidationResult;
}

/// Ordered set of validators resolved from the component registry
pub struct ValidatorChain {
    input_kind: InputKind,
    validators: Vec<(ComponentKind, Box<dyn ElementValidator>)>,
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorChain")
            .field("input_kind", &self.input_kind)
            .field("components", &self.components())
            .finish()
    }
}

impl ValidatorChain {
    /// Resolve and instantiate the validators configured for `input_kind`
    pub fn from_registry(registry: &ComponentRegistry, input_kind: InputKind) -> Result<Self> {
        let kinds = registry.resolve(input_kind, Capability::Validator)?;
        let validators = kinds
            .into_iter()
            .filter_map(|kind| kind.validator().map(|validator| (kind, validator)))
            .collect::<Vec<_>>();

        debug!(
            "Resolved {} validators for {} input: {:?}",
            validators.len(),
            input_kind,
            validators.iter().map(|(kind, _)| *kind).collect::<Vec<_>>()
        );

        Ok(Self {
            input_kind,
            validators,
        })
    }

    pub fn components(&self) -> Vec<ComponentKind> {
        self.validators.iter().map(|(kind, _)| *kind).collect()
    }

    /// Run every validator in order and merge their findings
    pub fn run(&self, context: &DocumentContext) -> ValidationResult {
        let mut aggregate = ValidationResult::new();

        for (kind, validator) in &self.validators {
            let result = match panic::catch_unwind(AssertUnwindSafe(|| validator.validate(context))) {
                Ok(result) => result,
                Err(_) => {
                    warn!("Validator '{}' panicked; reporting an internal error", kind);
                    ValidationResult::failed(
                        Finding::new(FindingKind::Internal, validator.name())
                            .with_detail(format!("validator '{}' aborted unexpectedly", kind)),
                    )
                }
            };

            debug!(
                "Validator '{}' finished with {} errors and {} warnings",
                kind,
                result.errors().len(),
                result.warnings().len()
            );
            aggregate.merge(result);
        }

        aggregate
    }
}
