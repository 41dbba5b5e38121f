/// TalentGate - Job and internship listing portal
///
/// Admins submit job and internship drafts, a super admin moderates
/// them, and approved listings are published for browsing.

mod api;
mod auth;
mod config;
mod content;
mod context;
mod db;
mod directory;
mod error;
mod mailer;
mod metrics;
mod moderation;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::PortalResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> PortalResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talentgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
