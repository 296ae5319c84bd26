/// Error types surfaced to callers of the engine

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External collaborator the engine depends on for a decision cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collaborator {
    Forecaster,
    Weather,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::Forecaster => write!(f, "forecast producer"),
            Collaborator::Weather => write!(f, "weather source"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    /// A collaborator failed; the current cycle (or the whole run) is aborted.
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: Collaborator,
        reason: String,
    },

    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SimError {
    pub fn forecaster(reason: impl Into<String>) -> Self {
        SimError::CollaboratorUnavailable {
            collaborator: Collaborator::Forecaster,
            reason: reason.into(),
        }
    }

    pub fn weather(reason: impl Into<String>) -> Self {
        SimError::CollaboratorUnavailable {
            collaborator: Collaborator::Weather,
            reason: reason.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = SimError::forecaster("exit status 1");
        assert_eq!(err.to_string(), "forecast producer unavailable: exit status 1");

        let err = SimError::invalid("day_of_week", "missing");
        assert_eq!(err.to_string(), "invalid input `day_of_week`: missing");
    }
}
