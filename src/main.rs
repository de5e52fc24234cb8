//! # PuntBot — race alert bot
//!
//! Reads the day's CSV feed of race selections, schedules one alert per
//! selection at `race start − lead minutes` in the configured timezone,
//! delivers each alert to Discord (webhook or bot channel), and exits once
//! the batch is drained.
//!
//! Usage:
//!   puntbot                      # feed and credentials from env / .env
//!   puntbot --csv feeds/        # directory searched for today's YYYY-MM-DD.csv
//!   puntbot -v                  # debug logging

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use puntbot_channels::{DiscordBotSink, DiscordWebhookSink};
use puntbot_core::{DeliverySink, MessageTemplate, PuntBotConfig, Transport};
use puntbot_feed::{SendTimeCalculator, read_feed, resolve_feed_path, validate_rows};
use puntbot_scheduler::{AlertScheduler, JobStatus, SentLedger, wait_until_drained};

#[derive(Parser)]
#[command(
    name = "puntbot",
    version,
    about = "🏇 PuntBot — schedules Discord race alerts from a daily CSV feed"
)]
struct Cli {
    /// Feed file, or a directory containing today's YYYY-MM-DD.csv
    /// (overrides CSV_PATH)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Message template JSON (overrides MESSAGE_TEMPLATE_PATH)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Default log filter covering every workspace crate — target prefixes are
/// module paths, so `puntbot=info` alone would not match
/// `puntbot_scheduler::engine` and friends.
fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    [
        "puntbot",
        "puntbot_core",
        "puntbot_feed",
        "puntbot_scheduler",
        "puntbot_channels",
    ]
    .map(|krate| format!("{krate}={level}"))
    .join(",")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose))),
        )
        .with_target(false)
        .init();

    let mut config = PuntBotConfig::from_env()?;
    if let Some(csv) = cli.csv {
        config.csv_path = csv;
    }
    if let Some(template) = cli.template {
        config.template_path = Some(template);
    }

    // Fail on missing credentials before touching the feed.
    let transport = config.transport()?;

    let calc = SendTimeCalculator::new(&config.timezone, config.lead_minutes);
    let today = calc.today();
    tracing::info!(
        "PuntBot v{} — zone {}, lead {}min, tolerance {}s",
        env!("CARGO_PKG_VERSION"),
        calc.tz(),
        config.lead_minutes,
        config.misfire_tolerance_secs
    );

    let feed_path = resolve_feed_path(&config.csv_path, today)?;
    let records = validate_rows(read_feed(&feed_path)?);
    if records.is_empty() {
        tracing::info!("No valid rows in the feed, nothing to schedule");
        return Ok(());
    }

    let template = MessageTemplate::load_or_default(config.template_path.as_deref())?;
    let ledger = SentLedger::open_scoped(&config.ledger_path, config.ledger_scope, today)?;
    let (mut scheduler, pending_rx) =
        AlertScheduler::new(ledger, config.misfire_tolerance_secs);

    let now = calc.now();
    let mut registered = 0usize;
    for record in &records {
        // Unparseable race time: the record is skipped, not an error.
        let Some((start, fire)) = calc.schedule_for(record) else {
            tracing::debug!("Skipping {}: bad race time '{}'", record.track, record.race_time);
            continue;
        };
        let payload = template.render(record);
        let status = scheduler.register(
            record.event_id(),
            fire,
            payload,
            record.channel_override.clone(),
            now,
        );
        if status == JobStatus::Pending {
            tracing::info!(
                "Scheduling alert of {} for {} — {}",
                start.format("%H:%M"),
                fire.format("%H:%M"),
                record.selection_name
            );
            registered += 1;
        }
    }
    tracing::info!("Scheduled {registered} of {} valid records", records.len());

    let sink: Arc<dyn DeliverySink> = match transport {
        Transport::Webhook { url } => Arc::new(DiscordWebhookSink::new(&url)),
        Transport::Bot {
            token,
            default_channel_id,
        } => {
            let sink = DiscordBotSink::new(&token, &default_channel_id)?;
            sink.connect().await?;
            Arc::new(sink)
        }
    };

    let scheduler = Arc::new(Mutex::new(scheduler));
    let runner = tokio::spawn(puntbot_scheduler::run(scheduler.clone(), sink));

    // Shut down once the pending set drains; joining the runner lets an
    // in-flight delivery finish first.
    wait_until_drained(pending_rx).await;
    runner.await?;

    let guard = scheduler.lock().await;
    let fired = guard
        .jobs()
        .iter()
        .filter(|j| j.status == JobStatus::Fired)
        .count();
    tracing::info!("Run complete: {fired} alerts delivered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_all_workspace_crates() {
        let filter = default_filter(false);
        for krate in [
            "puntbot=info",
            "puntbot_core=info",
            "puntbot_feed=info",
            "puntbot_scheduler=info",
            "puntbot_channels=info",
        ] {
            assert!(filter.contains(krate), "missing directive {krate} in '{filter}'");
        }
    }

    #[test]
    fn test_verbose_filter_uses_debug() {
        let filter = default_filter(true);
        assert!(filter.contains("puntbot_scheduler=debug"));
        assert!(!filter.contains("info"));
    }
}
