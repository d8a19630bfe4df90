//! Quote client: keeps a local quote collection in sync with a remote quote source.
//!
//! Every command opens the collection persisted under `--data-dir` (seeding a few default
//! quotes into an empty one) and then:
//!
//! - `run`: syncs once right away, then every `--interval-secs` until Ctrl+C, printing a
//!   short-lived notice whenever the server contributed new quotes.
//! - `sync`: runs a single sync cycle.
//! - `add`: stores a new quote and mirrors it to the server (best-effort).
//! - `random`, `categories`, `list`: read the collection.
//! - `export`, `import`: move the collection to and from a JSON file.
//!
//! Usage example (CLI):
//! ```bash
//! quote_cli --data-dir ./data add --text "Peace begins with a smile." --category Life
//! quote_cli --data-dir ./data --interval-secs 15 run
//! ```
#![warn(missing_docs)]
mod args;

use crate::args::{Args, Command};
use clap::Parser;
use crossbeam_channel::{select, tick};
use log::{error, info, warn};
use quote_common::net::QUOTES_SLOT;
use quote_common::{Result, SyncError};
use quote_sync::notifier::FanoutNotifier;
use quote_sync::{
    FileSlot, HttpGateway, LogNotifier, QuoteService, RecordStore, RemoteGateway, SharedStore,
    SyncOutcome, SyncScheduler, TransientNotifier,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

/// How often the `run` loop checks for shutdown and stale notices.
const POLL_INTERVAL_MS: u64 = 250;

fn main() {
    init_logger();
    let args = Args::parse();
    if let Err(e) = execute(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn execute(args: Args) -> Result<()> {
    let store = RecordStore::shared(FileSlot::new(&args.data_dir, QUOTES_SLOT));
    let gateway: Arc<dyn RemoteGateway> = Arc::new(HttpGateway::new(
        &args.server_url,
        Duration::from_secs(args.timeout_secs),
    ));
    let interval = Duration::from_secs(args.interval_secs);
    let notice_ttl = Duration::from_secs(args.notice_secs);
    let service = QuoteService::new(Arc::clone(&store), Arc::clone(&gateway));
    let seeded = seed_or_warn(&service);
    if seeded > 0 {
        info!("Seeded {} default quotes into {}", seeded, args.data_dir.display());
    }

    match args.command {
        Command::Run => run(store, gateway, interval, notice_ttl),
        Command::Sync => {
            let scheduler = SyncScheduler::new(store, gateway, Arc::new(LogNotifier), interval);
            if let Some(SyncOutcome::Completed { added }) = scheduler.run_logged() {
                println!("{} new quotes from the server", added);
            }
            Ok(())
        }
        Command::Add { text, category } => {
            let added = service.add_quote(&text, &category)?;
            println!("Quote added! ({})", added.record.id);
            // Give the best-effort mirror a chance before the process exits.
            if added.mirror.join().is_err() {
                warn!("Remote mirror thread panicked");
            }
            Ok(())
        }
        Command::Random { category } => {
            match service.random_quote(category.as_deref())? {
                Some(quote) => println!("{}", quote.text),
                None => println!("No quotes found in this category."),
            }
            Ok(())
        }
        Command::Categories => {
            for category in service.categories()? {
                println!("{}", category);
            }
            Ok(())
        }
        Command::List => {
            for quote in service.all()? {
                println!("{:>15} [{}] {}", quote.id, quote.category, quote.text);
            }
            Ok(())
        }
        Command::Export { path } => {
            let file = File::create(normalize_path(&path))?;
            service.export_json(BufWriter::new(file))?;
            info!("Quotes exported to {}", path);
            Ok(())
        }
        Command::Import { path } => {
            let file = File::open(normalize_path(&path))?;
            let added = service.import_json(BufReader::new(file))?;
            println!("Quotes imported successfully! ({} new)", added);
            Ok(())
        }
    }
}

/// Syncs right away, then periodically until Ctrl+C.
fn run(
    store: SharedStore,
    gateway: Arc<dyn RemoteGateway>,
    interval: Duration,
    notice_ttl: Duration,
) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| SyncError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let notices = Arc::new(TransientNotifier::new(notice_ttl));
    let notice_rx = notices.subscribe();
    let notifier = FanoutNotifier::new()
        .with(LogNotifier)
        .with(Arc::clone(&notices));
    let scheduler = Arc::new(SyncScheduler::new(store, gateway, Arc::new(notifier), interval));

    if scheduler.run_logged().is_none() {
        warn!("Startup sync failed, retrying in {:?}", scheduler.period());
    }
    let mut handle = Arc::clone(&scheduler).start();
    info!("Client is running. Press Ctrl+C to exit.");

    let poll = tick(Duration::from_millis(POLL_INTERVAL_MS));
    while !shutdown.load(Ordering::Relaxed) {
        select! {
            recv(notice_rx) -> notice => match notice {
                Ok(notice) => println!("Quotes synced with server! ({} new)", notice.added),
                Err(_) => break,
            },
            recv(poll) -> _ => {
                if notices.expire() {
                    println!("(notice dismissed)");
                }
            },
        }
    }

    handle.stop();
    info!("Client stopped.");
    Ok(())
}

/// Seeds default quotes into an empty store. A failure is logged and seeding is skipped.
fn seed_or_warn(service: &QuoteService) -> usize {
    match service.seed_defaults() {
        Ok(seeded) => seeded,
        Err(e) => {
            warn!("Could not seed default quotes: {}", e);
            0
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_common::QuoteRecord;
    use quote_sync::store::Slot;

    struct ReadOnlySlot;

    impl Slot for ReadOnlySlot {
        fn read(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _contents: &str) -> Result<()> {
            Err(std::io::Error::other("read-only file system").into())
        }
    }

    struct OneQuoteGateway;

    impl RemoteGateway for OneQuoteGateway {
        fn fetch_remote_batch(&self) -> Vec<QuoteRecord> {
            vec![QuoteRecord::from_remote(1, "from the server")]
        }

        fn post_record(&self, _record: &QuoteRecord) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn seeding_failure_is_not_fatal() {
        let store = RecordStore::shared(ReadOnlySlot);
        let service = QuoteService::new(Arc::clone(&store), Arc::new(OneQuoteGateway));
        assert_eq!(seed_or_warn(&service), 0);
        assert!(store.lock().unwrap().is_empty());
        assert_eq!(service.categories().unwrap(), vec!["all"]);
    }

    #[test]
    fn failed_startup_sync_is_logged_not_returned() {
        let scheduler = SyncScheduler::new(
            RecordStore::shared(ReadOnlySlot),
            Arc::new(OneQuoteGateway),
            Arc::new(LogNotifier),
            Duration::from_secs(20),
        );
        assert!(scheduler.run_once().is_err());
        assert!(scheduler.run_logged().is_none());
        assert_eq!(scheduler.state(), quote_common::SyncState::Idle);
    }

    #[test]
    fn normalize_path_strips_matching_quotes() {
        assert_eq!(normalize_path(" \"out.json\" "), PathBuf::from("out.json"));
        assert_eq!(normalize_path("plain.json"), PathBuf::from("plain.json"));
    }
}
