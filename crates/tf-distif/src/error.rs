//! Error types for the distributed fluid interface.

use tf_core::error::TfError;
use thiserror::Error;

/// Result type for distributed-interface operations.
pub type DistifResult<T> = Result<T, DistifError>;

/// Errors that can occur while configuring or stepping a distributed
/// fluid interface link.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistifError {
    /// Raised at construction; fatal. Covers both-force-flags-set,
    /// `moding_capacitance_ratio <= 1`, a missing capacitor handle, or a
    /// link mapped to a ground node.
    #[error("Configuration error: {what}")]
    Configuration { what: &'static str },

    /// Raised per tick when the inbound bulk mole fractions sum to
    /// (near) zero while this side is in Demand mode. Fatal to the tick;
    /// the caller decides how to proceed.
    #[error("Invalid interface data: {what}")]
    InvalidInterfaceData { what: &'static str },

    /// Non-finite or otherwise non-physical value encountered while
    /// processing a payload or stamping the solver.
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },
}

impl From<DistifError> for TfError {
    fn from(e: DistifError) -> Self {
        match e {
            DistifError::Configuration { what } => TfError::InvalidArg { what },
            DistifError::InvalidInterfaceData { what } => TfError::Invariant { what },
            DistifError::NonPhysical { what } => TfError::Invariant { what },
        }
    }
}
