//! Command implementations.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};

use pagekit_core::assets::{run_lifecycle, AssetWorker, DiskCacheStore, HttpFetcher, ServedFrom};
use pagekit_core::checkin::{self, CheckinBoard, CheckinKey, KEY_ENCODING_VERSION};
use pagekit_core::reset::{reset_checkins, CheckinView, LocalClock, ResetGuard};
use pagekit_core::store::FileStore;
use pagekit_core::Config;

/// Terminal stand-in for the page's checkboxes.
struct TerminalView;

impl CheckinView for TerminalView {
    fn uncheck_all(&mut self) {
        eprintln!("All checkboxes unchecked");
    }
}

fn open_store(config: &Config) -> Result<FileStore> {
    let path = config.store_path()?;
    FileStore::open(&path).with_context(|| format!("Failed to open page state {}", path.display()))
}

fn open_caches(config: &Config) -> Result<DiskCacheStore> {
    Ok(DiskCacheStore::new(config.caches_dir()?)?)
}

pub async fn update(config: &Config) -> Result<()> {
    let fetcher = HttpFetcher::new(config.base_url()?)?;
    let mut worker = AssetWorker::new(
        open_caches(config)?,
        fetcher,
        config.version_tag.clone(),
        config.manifest.clone(),
    );

    let (effects, report) = run_lifecycle(&mut worker).await?;
    info!(?effects, "Asset worker lifecycle complete");

    eprintln!(
        "Installed {} ({} assets), removed {} old cache(s)",
        config.version_tag,
        config.manifest.len(),
        report.deleted.len()
    );
    for (name, e) in &report.failed {
        eprintln!("Could not remove cache {}: {}", name, e);
    }
    Ok(())
}

pub async fn serve(config: &Config, resource: &str) -> Result<()> {
    let fetcher = HttpFetcher::new(config.base_url()?)?;
    let worker = AssetWorker::resume(
        open_caches(config)?,
        fetcher,
        config.version_tag.clone(),
        config.manifest.clone(),
    )
    .await
    .context("Run `pagekit update` first")?;

    let served = worker.serve(resource).await?;
    let source = match served.from {
        ServedFrom::Cache => "cache",
        ServedFrom::Network => "network",
    };
    eprintln!("{} {} (from {})", served.response.status, resource, source);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&served.response.body)?;
    stdout.flush()?;
    Ok(())
}

pub async fn status(config: &Config) -> Result<()> {
    let caches = open_caches(config)?;
    let summaries = caches.summaries().await?;
    if summaries.is_empty() {
        println!("caches: none");
    }
    for summary in summaries {
        let marker = if summary.name == config.version_tag { " (current)" } else { "" };
        match summary.entries {
            Ok(entries) => println!(
                "cache {}{}: {} entries, updated {}",
                summary.name,
                marker,
                entries,
                summary.age.unwrap_or_else(|| "never".to_string())
            ),
            Err(e) => println!("cache {}{}: unreadable ({})", summary.name, marker, e),
        }
    }

    let store = open_store(config)?;
    let last_reset = ResetGuard::last_reset(&store)?
        .map(|d| d.to_string())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "checkins stored: {} (key encoding v{})",
        checkin::stored_keys(&store)?.len(),
        KEY_ENCODING_VERSION
    );
    println!("last reset: {}", last_reset);
    println!(
        "reset window: {} {:02}:00-{:02}:59",
        config.reset.weekday, config.reset.hour, config.reset.hour
    );
    Ok(())
}

pub fn check_reset(config: &Config) -> Result<()> {
    let mut store = open_store(config)?;
    let guard = ResetGuard::new(config.reset);

    match guard.run_on_load(&mut store, &mut TerminalView, &LocalClock)? {
        Some(outcome) => eprintln!("Reset {} checkin(s) on {}", outcome.cleared, outcome.date),
        None => eprintln!("No reset due"),
    }
    Ok(())
}

pub fn reset(config: &Config) -> Result<()> {
    let mut store = open_store(config)?;
    let outcome = reset_checkins(&mut store, &mut TerminalView, Local::now().date_naive())?;
    eprintln!("Reset {} checkin(s) on {}", outcome.cleared, outcome.date);
    Ok(())
}

pub fn checkin(config: &Config, table: &str, item: &str, state: &str) -> Result<()> {
    let key = CheckinKey::new(
        table.parse::<usize>().with_context(|| format!("Invalid table index {:?}", table))?,
        item.parse::<usize>().with_context(|| format!("Invalid item index {:?}", item))?,
    );
    let checked = match state {
        "on" | "true" => true,
        "off" | "false" => false,
        other => anyhow::bail!("Checkbox state must be on or off, got {:?}", other),
    };

    let mut store = open_store(config)?;
    checkin::save(&mut store, key, checked)?;
    eprintln!("{} = {}", key, checked);
    Ok(())
}

pub fn board(config: &Config, counts: &[String]) -> Result<()> {
    let tables = counts
        .iter()
        .map(|c| c.parse::<usize>().with_context(|| format!("Invalid checkbox count {:?}", c)))
        .collect::<Result<Vec<usize>>>()?;

    let store = open_store(config)?;
    let states = CheckinBoard::new(tables).restore(&store)?;
    if states.is_empty() {
        warn!("Board has no checkboxes");
    }
    for state in states {
        println!("{} [{}]", state.key, if state.checked { "x" } else { " " });
    }
    Ok(())
}
