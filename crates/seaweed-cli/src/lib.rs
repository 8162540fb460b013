use anyhow::{bail, Context, Result};
use seaweed_core::models::FilerEntry;
use serde::Serialize;

/// Initialize tracing for the CLI. Logs go to stderr so stdout can carry
/// downloaded content.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", rendered);
    Ok(())
}

/// Parse a `Name=value` tag argument.
pub fn parse_tag(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => bail!("tag '{}' must be written as Name=value", raw),
    }
}

/// Human readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// One `ls` output line: kind, size, modification time and name.
pub fn entry_line(entry: &FilerEntry) -> String {
    let attributes = entry.attributes();
    let kind = if entry.is_directory() { "d" } else { "-" };
    let mtime = attributes
        .mtime
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let name = if entry.is_directory() {
        format!("{}/", entry.name())
    } else {
        entry.name().to_string()
    };
    format!(
        "{} {:>10} {} {}",
        kind,
        format_size(attributes.file_size),
        mtime,
        name
    )
}
