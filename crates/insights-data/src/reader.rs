//! Export discovery and CSV loading.
//!
//! Finds `Connections.csv` and `messages.csv` inside an extracted LinkedIn
//! export and parses them into [`RawContact`] rows and localized
//! [`MessageRecord`]s for downstream processing.

use std::path::{Path, PathBuf};

use insights_core::error::{InsightsError, Result};
use insights_core::models::MessageRecord;
use insights_core::time_utils::TimezoneHandler;
use serde::Deserialize;
use tracing::{debug, warn};

pub const CONNECTIONS_FILE: &str = "Connections.csv";
pub const MESSAGES_FILE: &str = "messages.csv";

/// `Connections.csv` starts with a short notes block before the header row.
pub const CONNECTIONS_PREAMBLE_LINES: usize = 3;

const CONTACT_COLUMNS: &[&str] = &["first_name", "last_name", "company", "position", "connected_on"];
const MESSAGE_COLUMNS: &[&str] = &["conversation_id", "from", "to", "date"];

// ── Raw rows ──────────────────────────────────────────────────────────────────

/// One `Connections.csv` row as exported, before cleaning.
///
/// Empty cells deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawContact {
    /// 1-based data row number, for error messages.
    #[serde(skip)]
    pub row: usize,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub connected_on: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    conversation_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    date: Option<String>,
}

/// Everything read from one export directory.
#[derive(Debug, Clone)]
pub struct ExportData {
    pub contacts: Vec<RawContact>,
    /// `None` when the export carries no message log.
    pub messages: Option<Vec<MessageRecord>>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find `file_name` (case-insensitive) anywhere under `dir`.
///
/// The shallowest match wins; ties are broken by path order.
pub fn find_export_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    if !dir.exists() {
        warn!("Export path does not exist: {}", dir.display());
        return None;
    }

    let mut matches: Vec<(usize, PathBuf)> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| name.eq_ignore_ascii_case(file_name))
                    .unwrap_or(false)
        })
        .map(|entry| (entry.depth(), entry.into_path()))
        .collect();

    matches.sort();
    matches.into_iter().next().map(|(_, path)| path)
}

/// Read both export files from `dir`.
///
/// A missing connections file is an error; a missing message log is not.
pub fn load_export(dir: &Path, tz: &TimezoneHandler) -> Result<ExportData> {
    let connections =
        find_export_file(dir, CONNECTIONS_FILE).ok_or_else(|| InsightsError::ExportFileNotFound {
            name: CONNECTIONS_FILE.to_string(),
            dir: dir.to_path_buf(),
        })?;
    let contacts = load_contacts(&connections)?;

    let messages = match find_export_file(dir, MESSAGES_FILE) {
        Some(path) => Some(load_messages(&path, tz)?),
        None => {
            warn!("No {} in {}, skipping chat analysis", MESSAGES_FILE, dir.display());
            None
        }
    };

    Ok(ExportData { contacts, messages })
}

/// Load `Connections.csv` from disk.
pub fn load_contacts(path: &Path) -> Result<Vec<RawContact>> {
    let text = read_file(path)?;
    let contacts = parse_contacts(&text)?;
    debug!("Read {} contact rows from {}", contacts.len(), path.display());
    Ok(contacts)
}

/// Load `messages.csv` from disk, localizing timestamps with `tz`.
pub fn load_messages(path: &Path, tz: &TimezoneHandler) -> Result<Vec<MessageRecord>> {
    let text = read_file(path)?;
    let messages = parse_messages(&text, tz)?;
    debug!("Read {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

/// Parse the text of `Connections.csv`, skipping the notes preamble.
pub fn parse_contacts(text: &str) -> Result<Vec<RawContact>> {
    let body = skip_lines(strip_bom(text), CONNECTIONS_PREAMBLE_LINES);
    let mut reader = csv_reader(body);
    normalize_headers(&mut reader, CONTACT_COLUMNS)?;

    let mut contacts = Vec::new();
    for (idx, result) in reader.deserialize::<RawContact>().enumerate() {
        let mut contact = result?;
        contact.row = idx + 1;
        contacts.push(contact);
    }
    Ok(contacts)
}

/// Parse the text of `messages.csv`.
///
/// Every `DATE` must be `YYYY-MM-DD HH:MM:SS UTC`; anything else aborts the
/// import with [`InsightsError::MalformedTimestamp`].
pub fn parse_messages(text: &str, tz: &TimezoneHandler) -> Result<Vec<MessageRecord>> {
    let mut reader = csv_reader(strip_bom(text));
    normalize_headers(&mut reader, MESSAGE_COLUMNS)?;

    let mut messages = Vec::new();
    for (idx, result) in reader.deserialize::<RawMessage>().enumerate() {
        let raw = result?;
        let date = raw.date.unwrap_or_default();
        let timestamp =
            tz.parse_and_localize(&date)
                .ok_or_else(|| InsightsError::MalformedTimestamp {
                    row: idx + 1,
                    value: date.clone(),
                })?;

        messages.push(MessageRecord {
            conversation_id: raw.conversation_id.unwrap_or_default(),
            from: raw.from.unwrap_or_default(),
            to: raw.to.unwrap_or_default(),
            timestamp,
        });
    }
    Ok(messages)
}

/// Lowercase a header and collapse every run of non-alphanumeric characters
/// into a single `_` (`"Connected On"` → `"connected_on"`).
pub fn normalize_column_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| InsightsError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return "",
        }
    }
    rest
}

fn csv_reader(body: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes())
}

/// Replace the header row with normalized names and check `required` are present.
fn normalize_headers(reader: &mut csv::Reader<&[u8]>, required: &[&str]) -> Result<()> {
    let headers: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(normalize_column_name)
        .collect();

    if let Some(missing) = required
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(InsightsError::MissingColumn((*missing).to_string()));
    }

    reader.set_headers(headers);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
