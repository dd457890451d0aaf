use anyhow::Result;
use hostpulse::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = match config::AgentConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let system_source: Arc<dyn source::SystemSource> = Arc::new(sysinfo_repo::SysinfoRepo::new(
        app_config.net_interface.clone(),
    ));
    let agent = Arc::new(agent::Agent::new(&app_config, system_source)?);

    // Static host facts are gathered once up front; later ticks reuse them.
    if let Err(e) = agent.host_profile().get().await {
        tracing::warn!(error = %e, "host profile unavailable at startup; will retry each tick");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let scheduler_handle = scheduler::spawn(
        agent.clone(),
        scheduler::SchedulerConfig {
            interval_ms: app_config.interval_ms,
            stats_log_interval_secs: app_config.stats_log_interval_secs,
        },
        shutdown_rx,
    );

    tracing::info!(
        server_id = %app_config.server_id,
        dashboard_url = %app_config.dashboard_url,
        interval_ms = app_config.interval_ms,
        version = version::VERSION,
        "agent started"
    );

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = scheduler_handle.await;
    Ok(())
}
