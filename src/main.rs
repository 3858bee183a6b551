use anyhow::Context;
use clap::Parser;
use interior_site::config::Command;
use interior_site::core::admin::{SessionStore, StaticCredentialGate};
use interior_site::domain::ports::Backend;
use interior_site::utils::error::{ErrorSeverity, SiteError};
use interior_site::utils::{logger, validation::Validate};
use interior_site::{
    create_router, AppState, CliConfig, InMemoryBackend, SiteConfig, SupabaseClient,
    TerminalWizard,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<SiteError>() {
            Some(site_error) => {
                tracing::error!(
                    "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                    site_error,
                    site_error.category(),
                    site_error.severity()
                );
                eprintln!("❌ {}", site_error.user_friendly_message());
                eprintln!("💡 建議: {}", site_error.recovery_suggestion());

                // 根據錯誤嚴重程度決定退出碼
                let exit_code = match site_error.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                };
                if exit_code > 0 {
                    std::process::exit(exit_code);
                }
            }
            None => {
                tracing::error!("❌ Command failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    match cli.command.clone() {
        Command::Serve { bind, in_memory } => {
            let config = load_config(&cli.config)?;
            if config.json_logs() {
                logger::init_server_logger(cli.verbose);
            } else {
                logger::init_cli_logger(cli.verbose);
            }
            serve(config, bind, in_memory).await
        }
        Command::Estimate { dry_run } => {
            logger::init_cli_logger(cli.verbose);
            estimate(&cli.config, dry_run).await
        }
    }
}

fn load_config(path: &str) -> Result<SiteConfig, SiteError> {
    let config = SiteConfig::from_file(path)?;
    config.validate()?;
    Ok(config)
}

async fn serve(config: SiteConfig, bind: Option<String>, in_memory: bool) -> anyhow::Result<()> {
    let backend: Arc<dyn Backend> = if in_memory {
        tracing::warn!("⚠️ Using in-memory backend; nothing will be persisted");
        Arc::new(InMemoryBackend::new())
    } else {
        Arc::new(SupabaseClient::from_config(&config.backend)?)
    };

    if !config.admin_configured() {
        tracing::warn!("⚠️ Admin credentials are not configured; admin login is disabled");
    }
    let gate = StaticCredentialGate::new(config.admin_id(), config.admin_password());
    let sessions = SessionStore::new(config.session_ttl());
    let state = AppState::new(backend, Arc::new(gate), sessions);
    let app = create_router(state);

    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("🚀 Serving on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn estimate(config_path: &str, dry_run: bool) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut terminal = TerminalWizard::new(stdin.lock(), std::io::stdout());

    let lead = if dry_run {
        terminal.run(None::<&SupabaseClient>).await?
    } else {
        let config = load_config(config_path)?;
        let client = SupabaseClient::from_config(&config.backend)?;
        terminal.run(Some(&client)).await?
    };

    if let Some(lead) = lead {
        tracing::info!("✅ Lead #{} stored for {}", lead.id, lead.client_name);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
    }
}
