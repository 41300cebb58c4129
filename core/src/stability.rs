//! Composes qualitative and structural signals into a single stability
//! scalar the decision engine can threshold against.

use std::collections::HashSet;

use crate::config::StabilityWeights;
use crate::model::{BlindEvaluation, Plan, StabilityMetrics, VsGoal, VsPrevious};
use crate::similarity::{bigram_similarity, jaccard_similarity, FUZZY_EQUAL_THRESHOLD};

#[derive(Debug, Default, Clone, Copy)]
pub struct StabilityTracker;

impl StabilityTracker {
    /// Compute [`StabilityMetrics`] for the current round.
    ///
    /// `previous_plan` is `None` on round 1; both `decision_reuse_rate`
    /// and `plan_similarity` fall back to the neutral `0.5` in that case.
    pub fn compute(
        &self,
        current_plan: &Plan,
        previous_plan: Option<&Plan>,
        evaluation: &BlindEvaluation,
        weights: &StabilityWeights,
    ) -> StabilityMetrics {
        let contradiction_ratio = contradiction_ratio(evaluation);
        let decision_reuse_rate = decision_reuse_rate(current_plan, previous_plan);
        let plan_similarity = plan_similarity(current_plan, previous_plan);
        let goal_convergence = goal_convergence(evaluation);

        let overall = weights.contradiction_ratio * (1.0 - contradiction_ratio)
            + weights.decision_reuse_rate * decision_reuse_rate
            + weights.plan_similarity * plan_similarity
            + weights.goal_convergence * goal_convergence;

        StabilityMetrics {
            contradiction_ratio,
            decision_reuse_rate,
            plan_similarity,
            goal_convergence,
            overall_stability: round2(overall),
        }
    }
}

fn contradiction_ratio(evaluation: &BlindEvaluation) -> f64 {
    (evaluation.contradictions.len() as f64 / 5.0).min(1.0)
}

fn decision_reuse_rate(current: &Plan, previous: Option<&Plan>) -> f64 {
    let Some(previous) = previous else {
        return 0.5;
    };

    let prev_items = flatten(previous);
    let curr_items = flatten(current);

    if curr_items.is_empty() {
        return 0.5;
    }

    let reused = curr_items
        .iter()
        .filter(|item| prev_items.iter().any(|p| bigram_similarity(item, p) > FUZZY_EQUAL_THRESHOLD))
        .count();

    reused as f64 / curr_items.len() as f64
}

fn flatten(plan: &Plan) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    items.extend(plan.goals.iter().cloned());
    items.extend(plan.constraints.iter().cloned());
    items.extend(plan.tasks.iter().map(|t| t.description.to_lowercase()));
    items
}

fn plan_similarity(current: &Plan, previous: Option<&Plan>) -> f64 {
    let Some(previous) = previous else {
        return 0.5;
    };

    let goals_a: HashSet<String> = current.goals.iter().map(|g| g.to_lowercase()).collect();
    let goals_b: HashSet<String> = previous.goals.iter().map(|g| g.to_lowercase()).collect();
    let goal_sim = jaccard_similarity(&goals_a, &goals_b);

    let constraints_a: HashSet<String> = current.constraints.iter().map(|c| c.to_lowercase()).collect();
    let constraints_b: HashSet<String> = previous.constraints.iter().map(|c| c.to_lowercase()).collect();
    let constraint_sim = jaccard_similarity(&constraints_a, &constraints_b);

    let tasks_a = current.tasks.len();
    let tasks_b = previous.tasks.len();
    let task_diff = (tasks_a as i64 - tasks_b as i64).unsigned_abs() as f64;
    let task_sim = 1.0 - task_diff / (tasks_a.max(tasks_b).max(1) as f64);

    (goal_sim + constraint_sim + task_sim) / 3.0
}

fn goal_convergence(evaluation: &BlindEvaluation) -> f64 {
    let goal_term = match evaluation.vs_goal {
        VsGoal::Closer => 1.0,
        VsGoal::Same => 0.5,
        VsGoal::Farther => 0.0,
    };
    let previous_term = match evaluation.vs_previous {
        VsPrevious::Better => 1.0,
        VsPrevious::Same => 0.5,
        VsPrevious::Worse => 0.0,
    };
    0.7 * goal_term + 0.3 * previous_term
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
