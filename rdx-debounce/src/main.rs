use anyhow::Result;
use debounce::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration: optional TOML path as the first argument, then env overrides.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DebounceConfig::load(config_path.as_deref())?;

    // 2. Initialize structured logging. RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(?config, "{} v{} demo starting.", debounce::LIBRARY_NAME, debounce::VERSION);

    // 3. Exercise both debouncers.
    run_call_burst(&config).await;
    run_typing_session(&config).await?;

    Ok(())
}

/// Fires a burst of calls spaced well inside the delay and reports how many landed.
async fn run_call_burst(config: &DebounceConfig) {
    let delay = config.call_delay();
    let fired = Arc::new(AtomicU32::new(0));
    let started = Instant::now();

    let counter = fired.clone();
    let save = debounce(
        move |(doc, revision): (&'static str, u32)| {
            counter.fetch_add(1, Ordering::Relaxed);
            info!(
                "[CALL] Saved {} at revision {} after {:?}.",
                doc,
                revision,
                started.elapsed()
            );
        },
        delay,
    );

    for revision in 1..=5 {
        info!("[CALL] Edit #{} queued.", revision);
        save.call(("notes.md", revision));
        sleep(delay / 3).await;
    }
    sleep(delay * 2).await;

    info!(
        "[CALL] 5 edits produced {} save(s).",
        fired.load(Ordering::Relaxed)
    );
}

/// Feeds keystrokes into a value debouncer the way a search box would, then
/// unmounts a second instance mid-window to show the pending commit is dropped.
async fn run_typing_session(config: &DebounceConfig) -> Result<()> {
    let delay = config
        .value_delay()
        .unwrap_or_else(|| Duration::from_millis(50));

    let mut search = ValueDebouncer::<String>::new();
    let mut commits = search.subscribe();
    for prefix in ["r", "ru", "rus", "rust"] {
        let shown = search.use_debounce(prefix.to_string(), Some(delay));
        info!("[VALUE] Typed {:?}, showing {:?}.", prefix, shown);
        sleep(delay / 5).await;
    }

    commits.changed().await?;
    let settled = commits.borrow_and_update().clone();
    info!("[VALUE] Settled on {:?}.", settled);
    let shown = search.use_debounce("rust".to_string(), Some(delay));
    info!("[VALUE] Re-render shows {:?}.", shown);

    let mut abandoned = ValueDebouncer::<String>::new();
    abandoned.use_debounce("draft".to_string(), Some(delay));
    let watcher = abandoned.subscribe();
    abandoned.unmount();
    sleep(delay * 2).await;
    info!(
        "[VALUE] Unmounted component still shows {:?}.",
        *watcher.borrow()
    );

    Ok(())
}
