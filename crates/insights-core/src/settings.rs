use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::time_utils::{TimezoneHandler, DEFAULT_TIMEZONE};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Insights into a LinkedIn connections and messages export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "linkedin-insights",
    about = "Insights into a LinkedIn connections and messages export",
    version
)]
pub struct Settings {
    /// Directory containing the extracted export (Connections.csv, messages.csv)
    pub export_dir: PathBuf,

    /// Timezone messages are localized into ("auto" for the system zone)
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Minimum connections per company for a node in the company network (1-50)
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub company_cutoff: u32,

    /// Minimum connections per position for a node in the position network (1-50)
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub position_cutoff: u32,

    /// Log-scale node sizes in the company network
    #[arg(long)]
    pub company_log_scale: bool,

    /// Log-scale node sizes in the position network
    #[arg(long)]
    pub position_log_scale: bool,

    /// Rows kept in the top companies / positions / correspondents tables
    #[arg(long, default_value = "10")]
    pub top_n: usize,

    /// Month counted as "new connections" (YYYY-MM, defaults to the current month)
    #[arg(long)]
    pub month: Option<String>,

    /// Similarity scorer used for job title canonicalization
    #[arg(long, default_value = "weighted", value_parser = ["weighted", "jaro-winkler"])]
    pub scorer: String,

    /// Write the JSON report here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.linkedin-insights/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_cutoff: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_cutoff: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scorer: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".linkedin-insights").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    ///
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);
        let saved_timezone = last.timezone.filter(|v| is_usable_timezone(v));

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = saved_timezone.clone() {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "company_cutoff") {
            if let Some(v) = last.company_cutoff.filter(|v| (1..=50).contains(v)) {
                settings.company_cutoff = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "position_cutoff") {
            if let Some(v) = last.position_cutoff.filter(|v| (1..=50).contains(v)) {
                settings.position_cutoff = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top_n") {
            if let Some(v) = last.top_n {
                settings.top_n = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "scorer") {
            if let Some(v) = last.scorer.filter(|v| v == "weighted" || v == "jaro-winkler") {
                settings.scorer = v;
            }
        }

        let mut params = LastUsedParams::from(&settings);
        // A mistyped zone must not stick; keep the previous good one instead.
        if !is_usable_timezone(&settings.timezone) {
            params.timezone = saved_timezone;
        }
        let _ = params.save_to(config_path);

        Self::resolve_auto_values(settings)
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone.eq_ignore_ascii_case("auto") {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            timezone: Some(s.timezone.clone()),
            company_cutoff: Some(s.company_cutoff),
            position_cutoff: Some(s.position_cutoff),
            top_n: Some(s.top_n),
            scorer: Some(s.scorer.clone()),
        }
    }
}

/// `"auto"` or a known IANA zone name.
fn is_usable_timezone(name: &str) -> bool {
    name.eq_ignore_ascii_case("auto") || TimezoneHandler::validate_timezone(name)
}

/// Returns `true` when `name` was supplied explicitly on the command line.
// NOTE: clap stores the arg id under the field name (underscores).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            timezone: Some("Europe/Berlin".to_string()),
            company_cutoff: Some(5),
            position_cutoff: Some(2),
            top_n: Some(25),
            scorer: Some("jaro-winkler".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.timezone, Some("Europe/Berlin".to_string()));
        assert_eq!(loaded.company_cutoff, Some(5));
        assert_eq!(loaded.position_cutoff, Some(2));
        assert_eq!(loaded.top_n, Some(25));
        assert_eq!(loaded.scorer, Some("jaro-winkler".to_string()));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.timezone.is_none());
        assert!(loaded.company_cutoff.is_none());
        assert!(loaded.top_n.is_none());
    }

    #[test]
    fn test_last_used_params_default_when_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).timezone.is_none());
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["linkedin-insights", "/tmp/export"]);

        assert_eq!(settings.export_dir, PathBuf::from("/tmp/export"));
        assert_eq!(settings.timezone, "US/Central");
        assert_eq!(settings.company_cutoff, 3);
        assert_eq!(settings.position_cutoff, 3);
        assert!(!settings.company_log_scale);
        assert!(!settings.position_log_scale);
        assert_eq!(settings.top_n, 10);
        assert!(settings.month.is_none());
        assert_eq!(settings.scorer, "weighted");
        assert!(settings.output.is_none());
        assert!(!settings.pretty);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_rejects_cutoff_out_of_range() {
        let result =
            Settings::try_parse_from(["linkedin-insights", "/tmp/export", "--company-cutoff", "0"]);
        assert!(result.is_err());
        let result =
            Settings::try_parse_from(["linkedin-insights", "/tmp/export", "--position-cutoff", "51"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_requires_export_dir() {
        assert!(Settings::try_parse_from(["linkedin-insights"]).is_err());
    }

    #[test]
    fn test_load_merges_last_used_when_not_explicit() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            timezone: Some("Europe/Berlin".to_string()),
            company_cutoff: Some(7),
            position_cutoff: None,
            top_n: Some(20),
            scorer: None,
        }
        .save_to(&path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["linkedin-insights", "/tmp/export", "--top-n", "5"]),
            &path,
        );

        assert_eq!(settings.timezone, "Europe/Berlin");
        assert_eq!(settings.company_cutoff, 7);
        assert_eq!(settings.position_cutoff, 3);
        // Explicit CLI value wins.
        assert_eq!(settings.top_n, 5);
    }

    #[test]
    fn test_load_persists_current_values() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            args(&["linkedin-insights", "/tmp/export", "--company-cutoff", "9"]),
            &path,
        );

        let saved = LastUsedParams::load_from(&path);
        assert_eq!(saved.company_cutoff, Some(9));
        assert_eq!(saved.timezone, Some("US/Central".to_string()));
    }

    #[test]
    fn test_load_clear_removes_config() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            company_cutoff: Some(12),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["linkedin-insights", "/tmp/export", "--clear"]),
            &path,
        );

        assert!(!path.exists());
        assert_eq!(settings.company_cutoff, 3);
    }

    #[test]
    fn test_invalid_timezone_is_not_carried_into_next_run() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let first = Settings::load_with_last_used_impl(
            args(&["linkedin-insights", "/tmp/export", "--timezone", "Mars/Olympus"]),
            &path,
        );
        // The explicit value is still reported back for this run.
        assert_eq!(first.timezone, "Mars/Olympus");
        assert!(LastUsedParams::load_from(&path).timezone.is_none());

        let second =
            Settings::load_with_last_used_impl(args(&["linkedin-insights", "/tmp/export"]), &path);
        assert_eq!(second.timezone, DEFAULT_TIMEZONE);
        assert!(crate::time_utils::resolve_timezone(&second.timezone).is_ok());
    }

    #[test]
    fn test_invalid_timezone_keeps_previous_saved_zone() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            args(&["linkedin-insights", "/tmp/export", "--timezone", "Asia/Tokyo"]),
            &path,
        );
        Settings::load_with_last_used_impl(
            args(&["linkedin-insights", "/tmp/export", "--timezone", "Asia/Tokio"]),
            &path,
        );

        let next =
            Settings::load_with_last_used_impl(args(&["linkedin-insights", "/tmp/export"]), &path);
        assert_eq!(next.timezone, "Asia/Tokyo");
    }

    #[test]
    fn test_corrupt_saved_timezone_is_ignored() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            timezone: Some("Not/AZone".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(args(&["linkedin-insights", "/tmp/export"]), &path);
        assert_eq!(settings.timezone, DEFAULT_TIMEZONE);
        assert_eq!(
            LastUsedParams::load_from(&path).timezone,
            Some(DEFAULT_TIMEZONE.to_string())
        );
    }

    #[test]
    fn test_auto_timezone_is_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        Settings::load_with_last_used_impl(
            args(&["linkedin-insights", "/tmp/export", "--timezone", "auto"]),
            &path,
        );
        assert_eq!(
            LastUsedParams::load_from(&path).timezone,
            Some("auto".to_string())
        );
    }

    #[test]
    fn test_debug_flag_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            args(&["linkedin-insights", "/tmp/export", "--debug"]),
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_from_settings_to_last_used() {
        let settings = Settings::parse_from([
            "linkedin-insights",
            "/tmp/export",
            "--timezone",
            "Asia/Tokyo",
            "--position-cutoff",
            "4",
        ]);
        let last = LastUsedParams::from(&settings);
        assert_eq!(last.timezone, Some("Asia/Tokyo".to_string()));
        assert_eq!(last.position_cutoff, Some(4));
        assert_eq!(last.company_cutoff, Some(3));
        assert_eq!(last.top_n, Some(10));
    }
}
