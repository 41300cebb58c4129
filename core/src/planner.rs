//! Prompt construction for the architect and refiner rounds, and the
//! locking validation that keeps refiner output honest.

use crate::error::OrchestratorError;
use crate::model::{Goal, LockedStructure, Plan};

/// Builds architect/refiner prompts and validates refined plans against a
/// locked structure. Stateless — every method takes exactly the inputs it
/// needs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Planner;

impl Planner {
    /// Prompt for the first round. Declares that the plan's structure
    /// will be locked after this round.
    pub fn architect_prompt(&self, goal: &Goal, context: &str) -> String {
        let context_line = if context.is_empty() {
            String::new()
        } else {
            format!("\nContext: {context}\n")
        };
        format!(
            "You are planning how to achieve the following goal.\n\
             Goal: {goal}\n\
             {context_line}\n\
             Produce a JSON object with exactly the keys `goals`, `tasks`, `constraints`.\n\
             `goals` is an array of strings. `tasks` is an array of objects with \
             `description`, `priority` (one of high, medium, low), and `dependencies` \
             (an array of task descriptions this task depends on). `constraints` is an \
             array of strings describing decisions and limits that should hold for the \
             rest of this plan.\n\
             This is the first round: the goals and constraints you choose here will be \
             locked and cannot be removed in later rounds. Prioritize correctness over \
             completeness.\n\
             Respond with the JSON object only."
        )
    }

    /// Prompt for every round after the first. Requires both the previous
    /// plan and the locked structure from round 1 — calling this without
    /// either is a programming error.
    pub fn refiner_prompt(
        &self,
        goal: &Goal,
        context: &str,
        previous_plan: Option<&Plan>,
        locked: Option<&LockedStructure>,
    ) -> Result<String, OrchestratorError> {
        let (previous_plan, locked) = match (previous_plan, locked) {
            (Some(p), Some(l)) => (p, l),
            _ => return Err(OrchestratorError::RefinerPreconditionViolated),
        };

        let context_line = if context.is_empty() {
            String::new()
        } else {
            format!("\nContext: {context}\n")
        };

        let locked_goals = locked
            .goals
            .iter()
            .map(|g| format!("  - {g}"))
            .collect::<Vec<_>>()
            .join("\n");
        let locked_decisions = locked
            .core_decisions
            .iter()
            .map(|d| format!("  - {d}"))
            .collect::<Vec<_>>()
            .join("\n");

        let previous_json = serde_json::to_string_pretty(previous_plan)
            .unwrap_or_else(|_| previous_plan.to_searchable_text());

        Ok(format!(
            "You are refining a plan toward the following goal.\n\
             Goal: {goal}\n\
             {context_line}\n\
             LOCKED STRUCTURE (DO NOT CHANGE):\n\
             Goals:\n{locked_goals}\n\
             Core decisions:\n{locked_decisions}\n\n\
             Previous plan:\n{previous_json}\n\n\
             You may add tasks, change task wording or priority, and add clarifying \
             constraints. You must not remove any locked goal or locked core decision.\n\
             Produce a JSON object with exactly the keys `goals`, `tasks`, `constraints`, \
             in the same shape as the previous plan. Respond with the JSON object only."
        ))
    }

    /// Validate a refined plan against the locked structure, returning one
    /// violation message per broken invariant. Never aborts the round —
    /// the caller logs these and continues.
    pub fn validate_against_locked(&self, plan: &Plan, locked: &LockedStructure) -> Vec<String> {
        let mut violations = Vec::new();
        let plan_text = plan.to_searchable_text().to_lowercase();
        let plan_goals_lower: Vec<String> = plan.goals.iter().map(|g| g.to_lowercase()).collect();

        for goal in &locked.goals {
            let goal_lower = goal.to_lowercase();
            if !plan_goals_lower.iter().any(|g| g == &goal_lower) {
                violations.push(format!("Locked goal removed: \"{goal}\""));
            }
        }

        for decision in &locked.core_decisions {
            let tokens: Vec<&str> = decision
                .split_whitespace()
                .filter(|t| t.len() > 4)
                .collect();
            if tokens.is_empty() {
                continue;
            }
            let present = tokens
                .iter()
                .filter(|t| plan_text.contains(&t.to_lowercase()))
                .count();
            if present * 2 < tokens.len() {
                violations.push(format!("Core decision may be violated: \"{decision}\""));
            }
        }

        violations
    }
}
