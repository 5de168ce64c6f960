//! Plain-text rendering of the receipt-row table.

use nfce_core::payload::{format_brl, parse_brazilian_decimal};
use nfce_core::api::ReceiptRow;

const HEADERS: [&str; 6] = [
    "ESTABELECIMENTO",
    "PRODUTO",
    "QTD",
    "UN",
    "VALOR",
    "DESCONTO",
];

/// Render rows as an aligned table with a computed total footer.
pub fn render(rows: &[ReceiptRow]) -> String {
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    let cells: Vec<[&str; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.establishment.as_str(),
                row.product.as_str(),
                row.quantity.as_str(),
                row.unit.as_str(),
                row.total_value.as_str(),
                if row.discount.is_empty() {
                    "-"
                } else {
                    row.discount.as_str()
                },
            ]
        })
        .collect();

    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS, &widths);

    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule_row: [&str; 6] = [
        &rules[0], &rules[1], &rules[2], &rules[3], &rules[4], &rules[5],
    ];
    push_row(&mut out, &rule_row, &widths);

    for row in &cells {
        push_row(&mut out, row, &widths);
    }

    let total: f64 = rows
        .iter()
        .filter_map(|row| parse_brazilian_decimal(&row.total_value))
        .sum();
    out.push_str(&format!(
        "\n{} items, total {}\n",
        rows.len(),
        format_brl(total)
    ));
    out
}

fn push_row(out: &mut String, cells: &[&str; 6], widths: &[usize]) {
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        // Pad by display width, not byte length.
        let pad = width.saturating_sub(cell.chars().count());
        out.extend(std::iter::repeat(' ').take(pad));
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}
