//! Expiry sweep for Bieterrunde.
//!
//! Deletes votings, with their bids, rounds and votes, that were created more
//! than `voting.expiry_days` days ago. Meant to run periodically, e.g. from cron.

use anyhow::Context;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bieterrunde_db::{VotingRepository, connect_with};
use bieterrunde_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bieterrunde=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;

    let cutoff = config.voting.expiry_cutoff(Utc::now());
    info!(
        expiry_days = config.voting.expiry_days,
        cutoff = %cutoff,
        "Sweeping expired votings"
    );

    let deleted = VotingRepository::new(db)
        .expire_votings(cutoff)
        .await
        .context("Failed to delete expired votings")?;
    info!(deleted, "Sweep finished");

    Ok(())
}
