use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

/// Serialize `report` as JSON into `writer`, followed by a newline.
pub fn write_report<T, W>(report: &T, pretty: bool, mut writer: W) -> anyhow::Result<()>
where
    T: Serialize,
    W: Write,
{
    if pretty {
        serde_json::to_writer_pretty(&mut writer, report)?;
    } else {
        serde_json::to_writer(&mut writer, report)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the report to `path`, or to stdout when `path` is `None`.
pub fn emit_report<T: Serialize>(report: &T, pretty: bool, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_report(report, pretty, std::io::BufWriter::new(file))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => write_report(report, pretty, std::io::stdout().lock())?,
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
