//! Terminal output formatting.

use colored::Colorize;

use l1watch_core::{AggregateOptions, ChainSnapshot, DashboardView};

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg.red());
}

/// Print a warning message.
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow().bold(), msg.yellow());
}

/// Print a header.
pub fn header(msg: &str) {
    println!("\n{}", msg.white().bold());
    println!("{}", "─".repeat(msg.chars().count()).dimmed());
}

/// Print a key-value pair.
pub fn kv(key: &str, value: &str) {
    println!("  {} {}", format!("{}:", key).dimmed(), value);
}

/// Print a helpful hint.
pub fn hint(msg: &str) {
    println!("{} {}", "💡".dimmed(), msg.dimmed());
}

/// Compact number: `1.2K`, `3.4M`, or the plain integer below a thousand.
pub fn format_number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{}", value.round() as u64)
    }
}

/// Age of a unix timestamp relative to `now_secs`, e.g. `12s ago`.
pub fn format_ago(timestamp: u64, now_secs: u64) -> String {
    let diff = now_secs.saturating_sub(timestamp);
    if diff < 60 {
        format!("{}s ago", diff)
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86_400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86_400)
    }
}

/// Render the totals panel followed by the chain table.
pub fn render_view(view: &DashboardView, options: &AggregateOptions, now_secs: u64) {
    header(&format!("l1watch · round {}", view.round));

    match &view.aggregate {
        Some(totals) => {
            kv("Total TPS", &format!("{:.2}", totals.total_tps));
            kv("Gas/s", &format_number(totals.total_gas_per_second));
            kv(
                "Avg utilization",
                &format!("{:.2}%", totals.average_utilization * 100.0),
            );
            kv("Live chains", &format!("{}/{}", totals.included_chains, view.chains.len()));
        }
        None => kv("Totals", "no chains configured"),
    }

    println!();
    println!(
        "  {:<18} {:>12} {:>8} {:>9} {:>9} {:>9} {:>7} {:>9} {:>5} {:>10}  {}",
        "Chain".bold(),
        "Block".bold(),
        "TPS".bold(),
        "Gas Used".bold(),
        "Gas Limit".bold(),
        "Gas/s".bold(),
        "Util".bold(),
        "Size".bold(),
        "Txs".bold(),
        "Age".bold(),
        "Status".bold()
    );
    println!("  {}", "─".repeat(116).dimmed());

    for snapshot in &view.chains {
        let highlighted = view.highlighted.as_deref() == Some(snapshot.blockchain_id.as_str());
        println!("{}", render_row(snapshot, highlighted, options, now_secs));
    }
    println!();
}

fn render_row(
    snapshot: &ChainSnapshot,
    highlighted: bool,
    options: &AggregateOptions,
    now_secs: u64,
) -> String {
    let marker = if highlighted { "★".yellow().bold().to_string() } else { " ".to_string() };
    let name = format!("{:<18}", truncate(&snapshot.chain_name, 18));
    let name = if highlighted { name.yellow().bold() } else { name.normal() };

    let status = match (&snapshot.error, snapshot.loading) {
        (Some(e), _) => e.red().to_string(),
        (None, true) => "loading…".dimmed().to_string(),
        (None, false) => "ok".green().to_string(),
    };

    let Some(metrics) = snapshot.metrics(options.block_time_secs) else {
        return format!(
            "{} {} {:>12} {:>8} {:>9} {:>9} {:>9} {:>7} {:>9} {:>5} {:>10}  {}",
            marker, name, "-", "-", "-", "-", "-", "-", "-", "-", "-", status
        );
    };

    let row = format!(
        "{} {} {:>12} {:>8.2} {:>9} {:>9} {:>9} {:>6.1}% {:>9} {:>5} {:>10}  {}",
        marker,
        name,
        metrics.block_number,
        metrics.tps,
        format_number(metrics.gas_used as f64),
        format_number(metrics.gas_limit as f64),
        format_number(metrics.gas_per_second(options.block_time_secs)),
        metrics.gas_utilization * 100.0,
        format_number(metrics.block_size as f64),
        metrics.transaction_count,
        format_ago(metrics.timestamp, now_secs),
        status
    );
    if snapshot.error.is_some() {
        row.dimmed().to_string()
    } else {
        row
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
