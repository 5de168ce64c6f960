//! One-shot subcommands against the backend.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use nfce_core::payload::format_brl;
use nfce_core::ApiClient;

use crate::table;

type CliResult = Result<(), Box<dyn std::error::Error>>;

pub async fn stats(client: Arc<ApiClient>) -> CliResult {
    let stats = tokio::task::spawn_blocking(move || client.stats()).await??;

    println!("items:     {}", stats.total_items);
    println!("total:     {}", format_brl(stats.total_value));
    println!("discounts: {}", format_brl(stats.total_discount));

    if !stats.stores.is_empty() {
        println!("stores:");
        for store in &stats.stores {
            println!("  {:>4}x {}", store.count, store.name);
        }
    }
    Ok(())
}

pub async fn data(client: Arc<ApiClient>) -> CliResult {
    let rows = tokio::task::spawn_blocking(move || client.data()).await??;

    if rows.is_empty() {
        println!("no receipt data yet - scan a QR code first");
        return Ok(());
    }
    print!("{}", table::render(&rows));
    Ok(())
}

pub async fn download(client: Arc<ApiClient>, output: Option<PathBuf>) -> CliResult {
    let bytes = tokio::task::spawn_blocking(move || client.download()).await??;

    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!("nfce_data_{}.csv", Local::now().format("%Y-%m-%d")))
    });
    std::fs::write(&path, &bytes)?;

    println!("saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

pub async fn clear(client: Arc<ApiClient>, yes: bool) -> CliResult {
    if !yes && !confirm("This permanently deletes ALL stored receipt data. Continue? [y/N] ")? {
        println!("aborted");
        return Ok(());
    }

    let message = tokio::task::spawn_blocking(move || client.clear()).await??;
    println!("{message}");
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, std::io::Error> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
