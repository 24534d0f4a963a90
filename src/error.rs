//! Configuration errors
//!
//! Problems with the document itself are reported as findings inside a
//! [`ValidationResult`](crate::validation::ValidationResult). The errors here
//! mean the component registry is unusable and the request must be aborted.

use thiserror::Error;

use crate::document::InputKind;
use crate::registry::Capability;

/// Fatal failure while loading or resolving the component registry
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("No {capability} components configured for {input_kind} input")]
    EmptyComponentList {
        input_kind: InputKind,
        capability: Capability,
    },

    #[error("Duplicate {capability} component '{identifier}' configured for {input_kind} input")]
    DuplicateComponent {
        input_kind: InputKind,
        capability: Capability,
        identifier: String,
    },

    #[error("Unknown component '{identifier}' configured for {input_kind} input")]
    UnknownComponent {
        input_kind: InputKind,
        identifier: String,
    },

    #[error("Component '{identifier}' cannot be used as a {capability} ({input_kind} input)")]
    WrongCapability {
        input_kind: InputKind,
        capability: Capability,
        identifier: String,
    },

    #[error("Failed to load component registry: {0}")]
    Load(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
