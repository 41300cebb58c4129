//! The round state machine tying Planner, Blind Judge, Stability Tracker,
//! and Decision Engine together into a single run.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use crate::config::OrchestratorConfig;
use crate::decision::DecisionEngine;
use crate::error::{ModelCallError, OrchestratorError};
use crate::eval_parser::parse_evaluation;
use crate::judge::BlindJudge;
use crate::model::{
    ExecutionResult, Goal, LockedStructure, OrchestratorState, Plan, RoundPhase, RoundState,
    TerminationReason,
};
use crate::plan_parser::parse_plan;
use crate::planner::Planner;
use crate::stability::StabilityTracker;

/// The future type returned by an injected model call.
pub type ModelFuture = Pin<Box<dyn Future<Output = Result<String, ModelCallError>> + Send>>;

/// The sole external dependency of the core: a request/response boundary
/// to whatever LLM provider the host wires up. No retry, backoff, or
/// provider-specific behavior belongs here — that is host policy.
pub trait ModelClient: Send + Sync {
    fn call(&self, prompt: String) -> ModelFuture;
}

impl<F> ModelClient for F
where
    F: Fn(String) -> ModelFuture + Send + Sync,
{
    fn call(&self, prompt: String) -> ModelFuture {
        (self)(prompt)
    }
}

/// Severity for [`LogEvent`], mirroring `tracing`'s levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A structured log entry delivered to [`Hooks::on_log`], in addition to
/// (not instead of) the `tracing` events emitted alongside it.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

type RoundStartHook = Box<dyn Fn(u32) + Send + Sync>;
type RoundCompleteHook = Box<dyn Fn(&RoundState) + Send + Sync>;
type TerminateHook = Box<dyn Fn(&ExecutionResult) + Send + Sync>;
type LogHook = Box<dyn Fn(&LogEvent) + Send + Sync>;

/// Observer hooks for progress reporting. None must throw; none may
/// mutate what they're given — callers only ever see shared references.
#[derive(Default)]
pub struct Hooks {
    pub on_round_start: Option<RoundStartHook>,
    pub on_round_complete: Option<RoundCompleteHook>,
    pub on_terminate: Option<TerminateHook>,
    pub on_log: Option<LogHook>,
}

impl Hooks {
    fn log(&self, level: LogLevel, message: impl Into<String>, data: Option<serde_json::Value>) {
        if let Some(hook) = &self.on_log {
            hook(&LogEvent {
                level,
                message: message.into(),
                data,
            });
        }
    }
}

/// The round state machine. Single-run: construct one per `execute` call,
/// or reuse across calls — `execute` resets all state at the start.
pub struct Orchestrator {
    model: Arc<dyn ModelClient>,
    config: OrchestratorConfig,
    planner: Planner,
    judge: BlindJudge,
    stability: StabilityTracker,
    decision: DecisionEngine,
    hooks: Hooks,
    state: Option<OrchestratorState>,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ModelClient>, config: OrchestratorConfig) -> Self {
        config.stability_weights.assert_valid();
        Self {
            model,
            config,
            planner: Planner,
            judge: BlindJudge,
            stability: StabilityTracker,
            decision: DecisionEngine,
            hooks: Hooks::default(),
            state: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Read-only snapshot of the current run's state. Panics if called
    /// before the first `execute`.
    pub fn get_state(&self) -> &OrchestratorState {
        self.state
            .as_ref()
            .expect("get_state called before execute")
    }

    /// Run the convergence loop to completion. Never returns an `Err` to
    /// the host: unrecoverable internal failures (a failed model call, or
    /// a plan that cannot be parsed) are caught and surfaced as a failed
    /// [`ExecutionResult`], per the error-handling policy of this crate.
    pub async fn execute(&mut self, goal: Goal, context: String) -> ExecutionResult {
        self.state = Some(OrchestratorState {
            goal: goal.clone(),
            context: context.clone(),
            current_round: RoundState::new(0, RoundPhase::Architect),
            round_history: Vec::new(),
            is_running: true,
            last_result: None,
        });

        let mut locked: Option<LockedStructure> = None;

        let outcome = self.run_loop(&goal, &context, &mut locked).await;

        let result = match outcome {
            Ok(result) => result,
            Err(err) => self.failed_result(&err),
        };

        let state = self.state.as_mut().expect("state initialized above");
        state.is_running = false;
        state.last_result = Some(result.clone());

        if let Some(hook) = &self.hooks.on_terminate {
            hook(&result);
        }

        result
    }

    async fn run_loop(
        &mut self,
        goal: &Goal,
        context: &str,
        locked: &mut Option<LockedStructure>,
    ) -> Result<ExecutionResult, OrchestratorError> {
        loop {
            let round_number = {
                let state = self.state.as_mut().expect("state initialized");
                if state.current_round.number > 0 {
                    let finished = state.current_round.clone();
                    state.round_history.push(finished);
                }
                state.current_round.number + 1
            };
            let phase = if round_number == 1 {
                RoundPhase::Architect
            } else {
                RoundPhase::Refiner
            };

            {
                let state = self.state.as_mut().expect("state initialized");
                state.current_round = RoundState::new(round_number, phase);
            }

            let span = info_span!("round", number = round_number, phase = ?phase);
            let _enter = span.enter();

            if let Some(hook) = &self.hooks.on_round_start {
                hook(round_number);
            }

            let previous_plan: Option<Plan> = self
                .state
                .as_ref()
                .expect("state initialized")
                .round_history
                .last()
                .and_then(|r| r.plan.clone());

            let plan_prompt = match phase {
                RoundPhase::Architect => self.planner.architect_prompt(goal, context),
                RoundPhase::Refiner => self.planner.refiner_prompt(
                    goal,
                    context,
                    previous_plan.as_ref(),
                    locked.as_ref(),
                )?,
            };

            let plan_text = self.model.call(plan_prompt).await?;
            debug!(round = round_number, "received plan text from model");
            let plan = parse_plan(&plan_text)?;
            debug!(round = round_number, plan_id = %plan.id, "parsed plan");

            if phase == RoundPhase::Refiner {
                if let Some(locked_structure) = locked.as_ref() {
                    let violations = self.planner.validate_against_locked(&plan, locked_structure);
                    for violation in &violations {
                        warn!(round = round_number, %violation, "locking violation");
                        self.hooks.log(
                            LogLevel::Warn,
                            format!("LockingViolation: {violation}"),
                            Some(serde_json::json!({ "round": round_number })),
                        );
                    }
                }
            }

            if round_number == 1 {
                *locked = Some(LockedStructure::from_round_one(&plan));
                info!("locked structure captured at round 1");
            }

            {
                let state = self.state.as_mut().expect("state initialized");
                state.current_round.plan = Some(plan.clone());
                state.current_round.locked_structure = locked.clone();
            }

            let eval_prompt = self
                .judge
                .evaluation_prompt(&plan, previous_plan.as_ref(), goal, locked.as_ref());
            let eval_text = self.model.call(eval_prompt).await?;
            let evaluation = parse_evaluation(&eval_text);
            debug!(round = round_number, "parsed evaluation");

            let metrics = self.stability.compute(
                &plan,
                previous_plan.as_ref(),
                &evaluation,
                &self.config.stability_weights,
            );

            let round_history_snapshot: Vec<RoundState> = self
                .state
                .as_ref()
                .expect("state initialized")
                .round_history
                .clone();

            let decision = self.decision.decide(
                round_number,
                &round_history_snapshot,
                &evaluation,
                &metrics,
                &self.config,
            );

            for warning in self
                .decision
                .validate_termination_decision(&decision, &evaluation)
            {
                warn!(round = round_number, %warning, "decision warning");
                self.hooks.log(
                    LogLevel::Warn,
                    format!("DecisionWarning: {warning}"),
                    Some(serde_json::json!({ "round": round_number })),
                );
            }

            {
                let state = self.state.as_mut().expect("state initialized");
                state.current_round.evaluation = Some(evaluation);
                state.current_round.stability = Some(metrics);
            }

            if let Some(hook) = &self.hooks.on_round_complete {
                let state = self.state.as_ref().expect("state initialized");
                hook(&state.current_round);
            }

            if decision.should_terminate {
                return Ok(ExecutionResult {
                    success: decision.reason.is_success(),
                    output: format!(
                        "Converged after {round_number} round(s): {}",
                        decision.reason
                    ),
                    round: round_number,
                    stability: metrics.overall_stability,
                    terminated: true,
                    termination_reason: decision.reason,
                });
            }
        }
    }

    fn failed_result(&self, err: &OrchestratorError) -> ExecutionResult {
        let last_stability = self
            .state
            .as_ref()
            .and_then(|s| s.current_round.stability)
            .map(|m| m.overall_stability)
            .unwrap_or(0.0);
        let round = self
            .state
            .as_ref()
            .map(|s| s.current_round.number)
            .unwrap_or(0);

        ExecutionResult {
            success: false,
            output: format!("run failed: {err}"),
            round,
            stability: last_stability,
            terminated: true,
            termination_reason: TerminationReason::MaxRoundsReached,
        }
    }
}
