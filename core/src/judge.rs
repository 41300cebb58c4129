//! Blind evaluation prompt construction and concern detection.
//!
//! "Blind" in the sense that the model being evaluated is never shown a
//! numeric score, and none is ever parsed back out — see
//! [`crate::model::BlindEvaluation`].

use crate::model::{BlindEvaluation, Goal, LockedStructure, Plan, VsGoal, VsPrevious};

/// Severity of a detected concern. Advisory only — the decision engine
/// computes its own termination conditions independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConcernSeverity {
    Low,
    Medium,
    High,
}

/// A single detected concern about the evaluation trend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concern {
    pub message: &'static str,
    pub severity: ConcernSeverity,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BlindJudge;

impl BlindJudge {
    /// Builds the evaluation prompt. Explicitly forbids numeric scores and
    /// names the exact keys the evaluation parser expects back.
    pub fn evaluation_prompt(
        &self,
        plan: &Plan,
        previous_plan: Option<&Plan>,
        goal: &Goal,
        locked: Option<&LockedStructure>,
    ) -> String {
        let plan_json =
            serde_json::to_string_pretty(plan).unwrap_or_else(|_| plan.to_searchable_text());

        let previous_section = match previous_plan {
            Some(prev) => {
                let prev_json = serde_json::to_string_pretty(prev)
                    .unwrap_or_else(|_| prev.to_searchable_text());
                format!("\nPrevious plan:\n{prev_json}\n")
            }
            None => String::new(),
        };

        let locked_section = match locked {
            Some(locked) => format!(
                "\nLocked goals: {}\n",
                locked.goals.join(", ")
            ),
            None => String::new(),
        };

        format!(
            "Evaluate the following plan against the stated goal.\n\
             Goal: {goal}\n\
             {locked_section}\
             Plan:\n{plan_json}\n\
             {previous_section}\n\
             Provide qualitative assessments only; do not provide numeric scores of any \
             kind. Respond with a JSON object with exactly the keys `vs_previous` (one of \
             better, same, worse — relative to the previous plan, or same if there is \
             none), `vs_goal` (one of closer, same, farther), `contradictions` (array of \
             strings describing internal contradictions), `missing` (array of strings \
             describing missing elements), and `risks` (array of strings describing \
             risks). Respond with the JSON object only."
        )
    }

    /// Detect concerns in the latest evaluation against the prior history.
    /// `history` excludes `latest` and is ordered oldest-first.
    pub fn detect_concerns(&self, history: &[BlindEvaluation], latest: &BlindEvaluation) -> Vec<Concern> {
        let mut concerns = Vec::new();

        if latest.vs_previous == VsPrevious::Worse {
            concerns.push(Concern {
                message: "plan degrading",
                severity: ConcernSeverity::Medium,
            });
        }

        if latest.vs_goal == VsGoal::Farther {
            concerns.push(Concern {
                message: "plan diverging",
                severity: ConcernSeverity::High,
            });
        }

        if let Some(prior) = history.last() {
            if latest.contradictions.len() > prior.contradictions.len() {
                concerns.push(Concern {
                    message: "contradictions increasing",
                    severity: ConcernSeverity::Medium,
                });
            }
        }

        if latest.contradictions.len() >= 5 {
            concerns.push(Concern {
                message: "too many contradictions",
                severity: ConcernSeverity::High,
            });
        }

        if latest.missing.len() >= 10 {
            concerns.push(Concern {
                message: "many elements missing",
                severity: ConcernSeverity::Medium,
            });
        }

        if latest.risks.len() >= 5 {
            concerns.push(Concern {
                message: "multiple risks",
                severity: ConcernSeverity::Medium,
            });
        }

        concerns
    }
}
