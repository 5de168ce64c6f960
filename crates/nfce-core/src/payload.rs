//! Decoded-payload validation and Brazilian number formatting.

use std::sync::OnceLock;

use regex::Regex;

/// Matches the receipt-URL shapes the official portals emit. Anchored at
/// the start so arbitrary text containing a keyword does not slip through.
fn receipt_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^https?://.*(fazenda|sefaz|nfce|nfe|qrcode|decodificacao|portal).*")
            .expect("receipt pattern is valid")
    })
}

/// Whether a decoded payload looks like an NFCe receipt URL.
///
/// Used to reject random QR codes before they ever reach the coordinator.
pub fn is_receipt_url(payload: &str) -> bool {
    receipt_pattern().is_match(payload)
}

/// Parse a Brazilian-formatted decimal (`"1.234,56"`) into its magnitude.
///
/// Thousands separators are dropped, the decimal comma becomes a point, and
/// stray minus signs are ignored (the backend prints discounts with a
/// leading minus). Returns `None` for blank or unparseable input.
pub fn parse_brazilian_decimal(text: &str) -> Option<f64> {
    let normalized: String = text
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if normalized.is_empty() {
        return None;
    }
    normalized.parse().ok()
}

/// Format a value as Brazilian currency: `1234.5` -> `"R$ 1.234,50"`.
pub fn format_brl(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{fraction:02}")
}
