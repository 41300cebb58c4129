//! Typed error taxonomy for the convergence pipeline.

use thiserror::Error;

/// Failure to extract a [`crate::model::Plan`] from model text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanParseError {
    /// No balanced `{...}` block could be located in the response.
    #[error("no balanced brace block found in model output")]
    NoBraceBlock,
    /// A brace block was found but did not parse as a JSON object.
    #[error("brace block did not parse as structured data: {0}")]
    MalformedObject(String),
}

/// The injected model function failed.
///
/// Wraps whatever the host's `callModel` implementation surfaced. The
/// orchestrator treats this as unrecoverable for the current run.
#[derive(Debug, Error)]
#[error("model call failed: {0}")]
pub struct ModelCallError(#[from] pub anyhow::Error);

/// Top-level error from [`crate::orchestrator::Orchestrator::execute`].
///
/// Only unrecoverable failures reach this type — parsing a malformed
/// evaluation, a refiner validation violation, or a termination warning
/// never do; those are logged and the round continues.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The injected model function raised.
    #[error(transparent)]
    ModelCall(#[from] ModelCallError),
    /// The plan parser failed on the architect or a refiner round.
    #[error(transparent)]
    PlanParse(#[from] PlanParseError),
    /// Building the refiner prompt was attempted before a locked structure
    /// and previous plan both existed. A programming error, not a
    /// recoverable run condition.
    #[error("refiner prompt requires both a previous plan and a locked structure")]
    RefinerPreconditionViolated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_parse_error_display() {
        let err = PlanParseError::NoBraceBlock;
        assert!(err.to_string().contains("brace block"));

        let err = PlanParseError::MalformedObject("bad".to_string());
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn model_call_error_wraps_anyhow() {
        let err = ModelCallError(anyhow::anyhow!("timeout"));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn orchestrator_error_from_conversions() {
        let err: OrchestratorError = PlanParseError::NoBraceBlock.into();
        assert!(matches!(err, OrchestratorError::PlanParse(_)));

        let err: OrchestratorError = ModelCallError(anyhow::anyhow!("x")).into();
        assert!(matches!(err, OrchestratorError::ModelCall(_)));
    }
}
