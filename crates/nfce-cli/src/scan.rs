//! The `scan` subcommand: stdin feed -> coordinator -> backend.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nfce_core::journal::{self, JournalHandle};
use nfce_core::payload;
use nfce_core::scanner::{ScanError, ScanEvent, ScanSource};
use nfce_core::{AlertLevel, ApiClient, EventBus, HttpSubmitter, ScanCoordinator, UiEvent};
use tokio::sync::mpsc;

use crate::source::StdinSource;

pub async fn run(
    client: Arc<ApiClient>,
    log_dir: Option<PathBuf>,
    allow_any_url: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let events = Arc::new(EventBus::new());
    let submitter = Arc::new(HttpSubmitter::new(Arc::clone(&client)));
    let coordinator = Arc::new(ScanCoordinator::new(submitter, Arc::clone(&events)));

    let journal = journal::open_journal(
        log_dir.as_deref(),
        &coordinator.session_id().to_string(),
    );

    let printer = spawn_printer(Arc::clone(&events), Arc::clone(&journal));

    // One channel carries both decodes and capture errors so the async loop
    // observes them in arrival order.
    let (feed_tx, mut feed_rx) = mpsc::unbounded_channel::<Result<ScanEvent, ScanError>>();
    let decode_tx = feed_tx.clone();

    let mut source = StdinSource::new();
    source.start(
        Box::new(move |event| {
            let _ = decode_tx.send(Ok(event));
        }),
        Box::new(move |err| {
            let _ = feed_tx.send(Err(err));
        }),
    )?;

    coordinator.start();
    log::info!(
        "scan session {} against {}",
        coordinator.session_id(),
        client.base_url()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            item = feed_rx.recv() => match item {
                // Stdin closed; the feed is over.
                None => break,
                Some(Err(err)) => {
                    events.alert(AlertLevel::Error, err.to_string());
                    break;
                }
                Some(Ok(event)) => {
                    if !allow_any_url && !payload::is_receipt_url(&event.payload) {
                        events.alert(
                            AlertLevel::Error,
                            format!("not a receipt URL: {}", event.payload),
                        );
                        continue;
                    }
                    coordinator.on_decoded(event);
                }
            },
        }
    }

    coordinator.stop();
    source.stop();

    // An in-flight submission is never cancelled; wait for it (and its
    // cooldown) to settle so the user sees the outcome.
    while coordinator.is_processing() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    printer.abort();

    Ok(())
}

/// Render coordinator feedback to the terminal and the scan journal.
fn spawn_printer(events: Arc<EventBus>, journal: JournalHandle) -> tokio::task::JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                UiEvent::ScannerStarted => {
                    println!("scanner active - one receipt URL per line, Ctrl+C to stop")
                }
                UiEvent::ScannerStopped => println!("scanner stopped"),
                UiEvent::ScanAccepted { url } => {
                    println!("scanned: {url}");
                    journal::record(&journal, "SCAN", &url);
                }
                UiEvent::Alert { level, message } => match level {
                    AlertLevel::Success => {
                        println!("ok: {message}");
                        journal::record(&journal, "OK", &message);
                    }
                    AlertLevel::Error => {
                        eprintln!("error: {message}");
                        journal::record(&journal, "ERR", &message);
                    }
                    AlertLevel::Info => println!("{message}"),
                },
                UiEvent::Rearmed => println!("ready for the next scan"),
            }
        }
    })
}
