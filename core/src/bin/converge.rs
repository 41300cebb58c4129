//! Demo harness wiring an OpenAI-chat-completions-compatible endpoint
//! into the convergence orchestrator. This binary is the only place in
//! the crate that performs HTTP — the core has no awareness of it.

use std::sync::Arc;

use clap::Parser;
use converge_core::{
    Hooks, LogEvent, LogLevel, ModelCallError, ModelClient, ModelFuture, Orchestrator,
    OrchestratorConfig,
};
use serde::Deserialize;
use serde_json::json;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(about = "Run the convergence orchestrator against an OpenAI-compatible endpoint")]
struct Args {
    /// The goal to plan toward.
    goal: String,

    /// Optional freeform context appended to every prompt.
    #[arg(long, default_value = "")]
    context: String,

    /// Hard upper bound on rounds.
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Stability score at which the run is considered converged.
    #[arg(long)]
    stability_threshold: Option<f64>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long)]
    endpoint: Option<String>,

    /// Model name to request.
    #[arg(long)]
    model: Option<String>,

    /// Verbose logging (debug level).
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

/// Defaults come from the environment, overridable by CLI flags.
struct LlmConfig {
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("CONVERGE_MODEL_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: std::env::var("CONVERGE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
        }
    }
}

struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ModelClient for OpenAiClient {
    fn call(&self, prompt: String) -> ModelFuture {
        let http = self.http.clone();
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let model = self.model.clone();
        let api_key = self.api_key.clone();

        Box::pin(async move {
            let mut request = http.post(&url).json(&json!({
                "model": model,
                "messages": [{ "role": "user", "content": prompt }],
            }));
            if let Some(key) = &api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| ModelCallError(anyhow::anyhow!(e)))?
                .error_for_status()
                .map_err(|e| ModelCallError(anyhow::anyhow!(e)))?;

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| ModelCallError(anyhow::anyhow!(e)))?;

            parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .ok_or_else(|| ModelCallError(anyhow::anyhow!("empty choices in model response")))
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(filter_level)
        .init();

    let llm_config = LlmConfig::default();
    let endpoint = args.endpoint.unwrap_or(llm_config.endpoint);
    let model = args.model.unwrap_or(llm_config.model);

    let client = Arc::new(OpenAiClient {
        http: reqwest::Client::new(),
        endpoint,
        model,
        api_key: llm_config.api_key,
    });

    let mut config = OrchestratorConfig::default();
    if let Some(max_rounds) = args.max_rounds {
        config.max_rounds = max_rounds;
    }
    if let Some(threshold) = args.stability_threshold {
        config.stability_threshold = threshold;
    }

    let hooks = Hooks {
        on_round_start: Some(Box::new(|round| {
            println!("--- round {round} starting ---");
        })),
        on_round_complete: Some(Box::new(|round| {
            if let Some(stability) = &round.stability {
                println!(
                    "round {} complete: stability={:.2}",
                    round.number, stability.overall_stability
                );
            }
        })),
        on_terminate: Some(Box::new(|result| {
            println!(
                "terminated after {} round(s): {} (success={})",
                result.round, result.termination_reason, result.success
            );
        })),
        on_log: Some(Box::new(|event: &LogEvent| {
            let marker = match event.level {
                LogLevel::Debug => "debug",
                LogLevel::Info => "info",
                LogLevel::Warn => "warn",
                LogLevel::Error => "error",
            };
            println!("[{marker}] {}", event.message);
        })),
    };

    let mut orchestrator = Orchestrator::new(client, config).with_hooks(hooks);
    let result = orchestrator.execute(args.goal, args.context).await;

    println!("\n{}", result.output);
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
