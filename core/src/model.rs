//! Core data model: plans, locked structure, blind evaluations, and the
//! round/run state that ties them together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-form goal supplied by the user. Immutable across the run.
pub type Goal = String;

/// Relative importance of a [`PlanTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Extensibility hook for task lifecycle. The core never advances this —
/// every task is created `Pending` and stays that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
}

/// A single unit of work within a [`Plan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTask {
    pub id: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub dependencies: Vec<String>,
}

impl PlanTask {
    /// Build a task with a freshly assigned id and `Pending` status.
    pub fn new(description: String, priority: Priority, dependencies: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description,
            priority,
            status: TaskStatus::Pending,
            dependencies,
        }
    }
}

/// A plan produced by one round. Created once, never mutated.
///
/// Identity of goals and constraints for invariant checks is
/// case-insensitive string equality; task order matters only for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub goals: Vec<String>,
    pub tasks: Vec<PlanTask>,
    pub constraints: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn new(goals: Vec<String>, tasks: Vec<PlanTask>, constraints: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            goals,
            tasks,
            constraints,
            created_at: Utc::now(),
        }
    }

    /// Serialize the plan to a compact string for keyword-coverage checks.
    pub fn to_searchable_text(&self) -> String {
        let mut parts = Vec::new();
        parts.extend(self.goals.iter().cloned());
        parts.extend(self.constraints.iter().cloned());
        for task in &self.tasks {
            parts.push(task.description.clone());
        }
        parts.join(" ")
    }
}

/// The goals and core decisions locked from the round-1 plan. Immutable
/// for the rest of the run — every later round's plan must satisfy the
/// locking invariants validated by [`crate::planner::Planner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedStructure {
    pub goals: Vec<String>,
    pub core_decisions: Vec<String>,
    pub locked_at_round: u32,
}

impl LockedStructure {
    pub fn from_round_one(plan: &Plan) -> Self {
        Self {
            goals: plan.goals.clone(),
            core_decisions: plan.constraints.clone(),
            locked_at_round: 1,
        }
    }
}

/// Qualitative comparison to the previous round's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VsPrevious {
    Better,
    Same,
    Worse,
}

/// Qualitative comparison to the stated goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VsGoal {
    Closer,
    Same,
    Farther,
}

/// A qualitative, never-numeric judgment of a plan. The model is never
/// asked for a score and none is parsed even if one is present in its
/// output — this is the mechanism by which the judge resists gaming by
/// the model being evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlindEvaluation {
    pub vs_previous: VsPrevious,
    pub vs_goal: VsGoal,
    pub contradictions: Vec<String>,
    pub missing: Vec<String>,
    pub risks: Vec<String>,
}

impl BlindEvaluation {
    /// The conservative default substituted whenever the evaluation
    /// parser cannot make sense of the model's output. The parser never
    /// raises — this is the normal outcome for unparseable text.
    pub fn conservative_default() -> Self {
        Self {
            vs_previous: VsPrevious::Same,
            vs_goal: VsGoal::Same,
            contradictions: vec!["Evaluation parsing failed".to_string()],
            missing: vec![],
            risks: vec!["Unable to properly evaluate plan".to_string()],
        }
    }
}

/// The four normalized signals the stability tracker composes, plus the
/// scalar they combine into. Every component lives in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    pub contradiction_ratio: f64,
    pub decision_reuse_rate: f64,
    pub plan_similarity: f64,
    pub goal_convergence: f64,
    pub overall_stability: f64,
}

/// Named, prioritized termination outcomes. `continue` is the only one
/// that does not end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminationReason {
    StabilityAchieved,
    MaxRoundsReached,
    ContradictionTrendUp,
    GoalDiverging,
    TaskComplete,
    Continue,
}

impl TerminationReason {
    /// Whether a run ending for this reason counts as a success.
    pub fn is_success(self) -> bool {
        matches!(self, Self::StabilityAchieved | Self::TaskComplete)
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StabilityAchieved => write!(f, "stability_achieved"),
            Self::MaxRoundsReached => write!(f, "max_rounds_reached"),
            Self::ContradictionTrendUp => write!(f, "contradiction_trend_up"),
            Self::GoalDiverging => write!(f, "goal_diverging"),
            Self::TaskComplete => write!(f, "task_complete"),
            Self::Continue => write!(f, "continue"),
        }
    }
}

/// The decision engine's verdict for a single round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TerminationDecision {
    pub should_terminate: bool,
    pub reason: TerminationReason,
    pub confidence: f64,
}

/// Which half of the loop a round is in. Exactly one round — the first —
/// is `Architect`; every later round is `Refiner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Architect,
    Refiner,
}

/// A completed or in-progress round's full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub number: u32,
    pub phase: RoundPhase,
    pub plan: Option<Plan>,
    pub evaluation: Option<BlindEvaluation>,
    pub stability: Option<StabilityMetrics>,
    pub locked_structure: Option<LockedStructure>,
}

impl RoundState {
    pub fn new(number: u32, phase: RoundPhase) -> Self {
        Self {
            number,
            phase,
            plan: None,
            evaluation: None,
            stability: None,
            locked_structure: None,
        }
    }
}

/// The orchestrator's full state for the lifetime of a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorState {
    pub goal: Goal,
    pub context: String,
    pub current_round: RoundState,
    pub round_history: Vec<RoundState>,
    pub is_running: bool,
    pub last_result: Option<ExecutionResult>,
}

/// The outcome of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    pub round: u32,
    pub stability: f64,
    pub terminated: bool,
    pub termination_reason: TerminationReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_reason_success() {
        assert!(TerminationReason::TaskComplete.is_success());
        assert!(TerminationReason::StabilityAchieved.is_success());
        assert!(!TerminationReason::MaxRoundsReached.is_success());
        assert!(!TerminationReason::GoalDiverging.is_success());
        assert!(!TerminationReason::ContradictionTrendUp.is_success());
        assert!(!TerminationReason::Continue.is_success());
    }

    #[test]
    fn locked_structure_from_round_one() {
        let plan = Plan::new(
            vec!["Ship X".to_string()],
            vec![],
            vec!["budget".to_string()],
        );
        let locked = LockedStructure::from_round_one(&plan);
        assert_eq!(locked.goals, vec!["Ship X".to_string()]);
        assert_eq!(locked.core_decisions, vec!["budget".to_string()]);
        assert_eq!(locked.locked_at_round, 1);
    }

    #[test]
    fn conservative_default_has_no_numeric_fields() {
        let eval = BlindEvaluation::conservative_default();
        let json = serde_json::to_value(&eval).unwrap();
        for value in json.as_object().unwrap().values() {
            assert!(!value.is_number());
        }
    }

    #[test]
    fn plan_searchable_text_includes_all_parts() {
        let plan = Plan::new(
            vec!["Ship X".to_string()],
            vec![PlanTask::new(
                "do X".to_string(),
                Priority::High,
                vec![],
            )],
            vec!["budget".to_string()],
        );
        let text = plan.to_searchable_text();
        assert!(text.contains("Ship X"));
        assert!(text.contains("do X"));
        assert!(text.contains("budget"));
    }
}
