//! Tagsweep retirement worker runtime.

#![forbid(unsafe_code)]

mod worker_config;

use std::sync::Arc;
use std::time::Duration;

use tagsweep_application::{RetirementDecisionEngine, RunCancellation, ScopeWalker};
use tagsweep_core::{AppError, AppResult};
use tagsweep_domain::RunSummary;
use tagsweep_infrastructure::{
    HttpResourceDeleter, InMemoryInventoryProvider, ModeActionExecutor, TracingAuditSink,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::worker_config::WorkerConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let action_executor = build_action_executor(&config)?;

    info!(
        tenant_id = %config.tenant_id,
        mode = %config.policy.mode(),
        tag_rule = %config.policy.tag_rule(),
        subscription_ids = ?config.scope.subscription_ids().collect::<Vec<_>>(),
        resource_group_names = ?config.scope.resource_group_names().collect::<Vec<_>>(),
        inventory_path = %config.inventory_path.display(),
        run_interval_seconds = config.run_interval.map(|interval| interval.as_secs()),
        "tagsweep-worker started"
    );

    let (cancel_handle, cancellation) = RunCancellation::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current resource");
            cancel_handle.cancel();
        }
    });

    loop {
        match run_once(&config, action_executor.clone(), &cancellation).await {
            Ok(summary) if summary.interrupted => break,
            Ok(_) => {}
            Err(error) if config.run_interval.is_none() => return Err(error),
            Err(error) => warn!(error = %error, "retirement run failed"),
        }

        let Some(interval) = config.run_interval else {
            break;
        };
        if cancellation.is_cancelled() {
            break;
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = cancellation.cancelled() => break,
        }
    }

    info!("tagsweep-worker stopped");
    Ok(())
}

async fn run_once(
    config: &WorkerConfig,
    action_executor: Arc<ModeActionExecutor>,
    cancellation: &RunCancellation,
) -> AppResult<RunSummary> {
    let inventory = InMemoryInventoryProvider::load_json_file(&config.inventory_path).await?;
    let walker = ScopeWalker::new(
        Arc::new(inventory),
        Arc::new(RetirementDecisionEngine::new()),
        action_executor,
        Arc::new(TracingAuditSink::new()),
    );

    walker
        .run(&config.scope, &config.policy, cancellation)
        .await
}

fn build_action_executor(config: &WorkerConfig) -> AppResult<Arc<ModeActionExecutor>> {
    let Some(endpoint) = config.delete_endpoint.as_ref() else {
        return Ok(Arc::new(ModeActionExecutor::new()));
    };

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let deleter = HttpResourceDeleter::new(
        http_client,
        endpoint.base_url.as_str(),
        endpoint.access_token.as_str(),
        endpoint.api_version.as_str(),
        endpoint.max_attempts,
        endpoint.retry_backoff_ms,
    )?;

    Ok(Arc::new(ModeActionExecutor::new().with_deleter(Arc::new(deleter))))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
