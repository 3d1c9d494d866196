//! Error kinds reported by the configurator core.
//!
//! Every kind except [`ConfiguratorError::RuntimeUnavailable`] is a local,
//! non-fatal rejection: the operation that produced it left the scene
//! untouched and the caller is expected to surface the message to the user.

use std::fmt;

/// What kind of entity a [`ConfiguratorError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A catalog product (pegboard or accessory)
    Product,
    /// A saved configuration
    Configuration,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => write!(f, "product"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Errors produced by scene transitions, catalog lookups and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfiguratorError {
    /// The 3D rendering engine is not loaded; the mount cannot proceed.
    RuntimeUnavailable,
    /// Unknown product id or configuration name.
    NotFound {
        /// Entity kind that was looked up
        kind: EntityKind,
        /// Id or name that was requested
        id: String,
    },
    /// Accessory cannot be placed on the current pegboard.
    IncompatibleProduct {
        /// Accessory that was rejected
        accessory_id: String,
        /// Currently selected pegboard
        pegboard_id: String,
    },
    /// An accessory placement was attempted with no pegboard selected.
    NoPegboardSelected,
    /// The placement cap has been reached.
    LimitExceeded {
        /// Configured maximum
        max: u32,
    },
    /// Placement index does not exist.
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of placements at the time of the request
        len: usize,
    },
    /// Invalid input (unsavable configuration, bad attribute, bad product).
    ValidationError(String),
}

impl ConfiguratorError {
    /// Shorthand for a missing product.
    pub fn product_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Product,
            id: id.into(),
        }
    }

    /// Shorthand for a missing saved configuration.
    pub fn configuration_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Configuration,
            id: name.into(),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Returns true when the mount cannot continue after this error.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::RuntimeUnavailable)
    }

    /// Stable machine-readable code for API and CLI output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RuntimeUnavailable => "runtime_unavailable",
            Self::NotFound { .. } => "not_found",
            Self::IncompatibleProduct { .. } => "incompatible_product",
            Self::NoPegboardSelected => "no_pegboard_selected",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::OutOfRange { .. } => "out_of_range",
            Self::ValidationError(_) => "validation_error",
        }
    }
}

impl fmt::Display for ConfiguratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuntimeUnavailable => {
                write!(f, "3D configurator engine is not available")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::IncompatibleProduct {
                accessory_id,
                pegboard_id,
            } => write!(
                f,
                "accessory '{accessory_id}' is not compatible with pegboard '{pegboard_id}'"
            ),
            Self::NoPegboardSelected => {
                write!(f, "select a pegboard before placing accessories")
            }
            Self::LimitExceeded { max } => {
                write!(f, "accessory limit reached (maximum {max})")
            }
            Self::OutOfRange { index, len } => {
                write!(f, "placement index {index} out of range (have {len})")
            }
            Self::ValidationError(message) => write!(f, "validation failed: {message}"),
        }
    }
}

impl std::error::Error for ConfiguratorError {}
