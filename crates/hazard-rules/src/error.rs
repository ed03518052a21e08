//! Rule set load and validation errors

use crate::id::RuleId;
use crate::source::{AssociationKind, TransmissionKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleError {
    #[error("failed to parse rule set: {0}")]
    Parse(String),

    #[error("hazard type '{hazard_type}' has an invalid exposure policy: {reason}")]
    InvalidExposure { hazard_type: RuleId, reason: String },

    #[error("hazard type '{hazard_type}' references unknown effect '{effect}'")]
    UnknownEffect { hazard_type: RuleId, effect: RuleId },

    #[error("hazard source '{source_id}' references unknown hazard type '{hazard_type}'")]
    UnknownHazardType { source_id: RuleId, hazard_type: RuleId },

    #[error(
        "hazard source '{source_id}': transmission '{transmission}' of hazard type '{hazard_type}' does not support association '{association}'"
    )]
    IncompatibleAssociation {
        source_id: RuleId,
        hazard_type: RuleId,
        transmission: TransmissionKind,
        association: AssociationKind,
    },
}

impl From<ron::error::SpannedError> for RuleError {
    fn from(err: ron::error::SpannedError) -> Self {
        RuleError::Parse(err.to_string())
    }
}
