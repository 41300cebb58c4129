//! Termination decision engine: a strict priority ladder of stop
//! conditions, computed deterministically from round history — never from
//! a model call.

use crate::config::OrchestratorConfig;
use crate::model::{BlindEvaluation, RoundState, StabilityMetrics, TerminationDecision, TerminationReason, VsGoal};

#[derive(Debug, Default, Clone, Copy)]
pub struct DecisionEngine;

impl DecisionEngine {
    /// Apply the priority-ordered rules. `round_history` holds only
    /// archived (completed) rounds, oldest first; it does not include the
    /// round currently being decided.
    pub fn decide(
        &self,
        current_round_number: u32,
        round_history: &[RoundState],
        latest_evaluation: &BlindEvaluation,
        latest_stability: &StabilityMetrics,
        config: &OrchestratorConfig,
    ) -> TerminationDecision {
        if latest_evaluation.missing.is_empty() && latest_evaluation.contradictions.is_empty() {
            return TerminationDecision {
                should_terminate: true,
                reason: TerminationReason::TaskComplete,
                confidence: 0.95,
            };
        }

        if latest_stability.overall_stability >= config.stability_threshold {
            return TerminationDecision {
                should_terminate: true,
                reason: TerminationReason::StabilityAchieved,
                confidence: latest_stability.overall_stability,
            };
        }

        if current_round_number >= config.max_rounds {
            return TerminationDecision {
                should_terminate: true,
                reason: TerminationReason::MaxRoundsReached,
                confidence: 1.0,
            };
        }

        if goal_diverging(round_history, latest_evaluation, config.goal_divergence_limit) {
            return TerminationDecision {
                should_terminate: true,
                reason: TerminationReason::GoalDiverging,
                confidence: 0.85,
            };
        }

        if contradiction_trend_up(round_history, latest_evaluation) {
            return TerminationDecision {
                should_terminate: true,
                reason: TerminationReason::ContradictionTrendUp,
                confidence: 0.75,
            };
        }

        TerminationDecision {
            should_terminate: false,
            reason: TerminationReason::Continue,
            confidence: 1.0 - latest_stability.overall_stability,
        }
    }

    /// Post-hoc sanity check on a decision already made. Returns warnings
    /// only — never overturns the decision.
    pub fn validate_termination_decision(
        &self,
        decision: &TerminationDecision,
        latest_evaluation: &BlindEvaluation,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        if decision.should_terminate
            && !latest_evaluation.missing.is_empty()
            && decision.reason != TerminationReason::MaxRoundsReached
        {
            warnings.push("terminating with missing items remaining".to_string());
        }

        if decision.should_terminate && decision.confidence < 0.7 {
            warnings.push(format!("terminating with low confidence ({:.2})", decision.confidence));
        }

        if decision.should_terminate && !latest_evaluation.risks.is_empty() {
            warnings.push("terminating while risks exist".to_string());
        }

        warnings
    }
}

fn goal_diverging(history: &[RoundState], latest: &BlindEvaluation, limit: u32) -> bool {
    let mut tail = 0u32;
    if latest.vs_goal != VsGoal::Farther {
        return false;
    }
    tail += 1;

    for round in history.iter().rev() {
        match &round.evaluation {
            Some(eval) if eval.vs_goal == VsGoal::Farther => tail += 1,
            _ => break,
        }
    }

    tail >= limit
}

fn contradiction_trend_up(history: &[RoundState], latest: &BlindEvaluation) -> bool {
    let archived_counts: Vec<usize> = history
        .iter()
        .filter_map(|r| r.evaluation.as_ref().map(|e| e.contradictions.len()))
        .collect();

    if archived_counts.len() < 2 {
        return false;
    }

    let n = archived_counts.len();
    let second_last = archived_counts[n - 2];
    let last = archived_counts[n - 1];

    second_last <= last && latest.contradictions.len() > last
}
