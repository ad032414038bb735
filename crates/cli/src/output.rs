//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use sense_lib::SignalSeverity;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a table, or `data` as JSON
pub fn print_rows<R: Tabled, T: Serialize + ?Sized>(
    rows: Vec<R>,
    data: &T,
    format: OutputFormat,
    empty_message: &str,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                print_warning(empty_message);
            } else {
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
        OutputFormat::Json => print_json(data)?,
    }
    Ok(())
}

pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Quote currency with thousands separators, e.g. `$95,120.50`
pub fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, frac)
}

/// Billions of quote currency, e.g. `$165.2B`
pub fn format_billions(amount: f64) -> String {
    format!("${:.1}B", amount)
}

/// Signed millions, e.g. `+$412.0M` / `-$35.5M`
pub fn format_net_flow(millions: f64) -> String {
    let sign = if millions < 0.0 { "-" } else { "+" };
    format!("{}${:.1}M", sign, millions.abs())
}

pub fn color_severity(severity: SignalSeverity) -> String {
    let label = severity.to_string();
    match severity {
        SignalSeverity::Info => label.blue().to_string(),
        SignalSeverity::Warning => label.yellow().to_string(),
        SignalSeverity::Critical => label.red().bold().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(95120.5), "$95,120.50");
        assert_eq!(format_usd(999.0), "$999.00");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_usd(-2500.25), "-$2,500.25");
    }

    #[test]
    fn test_format_flows() {
        assert_eq!(format_billions(165.24), "$165.2B");
        assert_eq!(format_net_flow(412.0), "+$412.0M");
        assert_eq!(format_net_flow(-35.54), "-$35.5M");
    }
}
