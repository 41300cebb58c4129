//! Round-based convergence controller for LLM planning.
//!
//! Drives repeated rounds of plan generation and blind evaluation toward
//! a stable plan for a user-supplied goal, locking the plan's goals and
//! core decisions after the first round so later rounds can only refine,
//! never redirect. See [`orchestrator::Orchestrator`] for the entry point.

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod decision;
pub mod error;
pub mod eval_parser;
pub mod judge;
pub mod model;
pub mod orchestrator;
pub mod plan_parser;
pub mod planner;
pub mod similarity;
pub mod stability;

pub use config::{OrchestratorConfig, StabilityBand, StabilityWeights};
pub use decision::DecisionEngine;
pub use error::{ModelCallError, OrchestratorError, PlanParseError};
pub use eval_parser::parse_evaluation;
pub use judge::{BlindJudge, Concern, ConcernSeverity};
pub use model::{
    BlindEvaluation, ExecutionResult, Goal, LockedStructure, OrchestratorState, Plan, PlanTask,
    Priority, RoundPhase, RoundState, StabilityMetrics, TerminationDecision, TerminationReason,
    VsGoal, VsPrevious,
};
pub use orchestrator::{Hooks, LogEvent, LogLevel, ModelClient, ModelFuture, Orchestrator};
pub use plan_parser::parse_plan;
pub use planner::Planner;
pub use stability::StabilityTracker;
