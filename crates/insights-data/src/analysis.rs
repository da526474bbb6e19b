//! Main analysis pipeline.
//!
//! Loads an export, cleans and canonicalizes the contacts, aggregates them,
//! builds both contact networks and every summary view, and returns one
//! serializable [`InsightsReport`].

use std::path::Path;
use std::time::Instant;

use chrono::{Datelike, Utc};
use chrono_tz::Tz;
use insights_core::error::{InsightsError, Result};
use insights_core::models::{AggregationRow, ContactField, ContactRecord};
use insights_core::settings::Settings;
use insights_core::similarity::scorer_by_name;
use insights_core::text_processing::TextNormalizer;
use insights_core::time_utils::{parse_year_month, resolve_timezone, TimezoneHandler};
use serde::Serialize;
use tracing::info;

use crate::aggregator::Aggregator;
use crate::canonicalizer::{CanonicalPass, LabelCanonicalizer};
use crate::chats::{analyze_chats, ChatReport};
use crate::cleaner::{clean, CleaningStats};
use crate::graph::{build_graph, GraphConfig, GraphView};
use crate::hierarchy::{company_hierarchy, position_hierarchy, HierarchyNode};
use crate::insights::{
    cumulative, email_directory, overview, timeline, weekday_histogram, ConnectionOverview,
    CumulativePoint, DateCount, EmailContact, WeekdayCount,
};
use crate::keywords::position_keywords;
use crate::reader::{load_export, ExportData};

pub const DEFAULT_CUTOFF: u32 = 3;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_SCORER: &str = "weighted";

// ── Options ───────────────────────────────────────────────────────────────────

/// Everything the pipeline needs besides the export itself.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub timezone: Tz,
    pub company_graph: GraphConfig,
    pub position_graph: GraphConfig,
    pub top_n: usize,
    /// `(year, month)` counted as "new connections".
    pub reference_month: (i32, u32),
    /// Name accepted by [`scorer_by_name`].
    pub scorer: String,
}

impl AnalysisOptions {
    /// Defaults for `timezone`: cutoff 3, linear sizing, top 10, current month.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            company_graph: GraphConfig::companies(DEFAULT_CUTOFF, false),
            position_graph: GraphConfig::positions(DEFAULT_CUTOFF, false),
            top_n: DEFAULT_TOP_N,
            reference_month: current_month(timezone),
            scorer: DEFAULT_SCORER.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timezone = resolve_timezone(&settings.timezone)?;

        let reference_month = match settings.month.as_deref() {
            Some(text) => parse_year_month(text).ok_or_else(|| {
                InsightsError::Config(format!("--month must be YYYY-MM, got {:?}", text))
            })?,
            None => current_month(timezone),
        };

        if scorer_by_name(&settings.scorer).is_none() {
            return Err(InsightsError::Config(format!(
                "unknown scorer {:?}",
                settings.scorer
            )));
        }

        Ok(Self {
            timezone,
            company_graph: GraphConfig::companies(settings.company_cutoff, settings.company_log_scale),
            position_graph: GraphConfig::positions(
                settings.position_cutoff,
                settings.position_log_scale,
            ),
            top_n: settings.top_n,
            reference_month,
            scorer: settings.scorer.clone(),
        })
    }

    /// Job-title canonicalizer using the configured scorer.
    pub fn canonicalizer(&self) -> Result<LabelCanonicalizer> {
        let scorer = scorer_by_name(&self.scorer)
            .ok_or_else(|| InsightsError::Config(format!("unknown scorer {:?}", self.scorer)))?;
        Ok(LabelCanonicalizer::new(
            LabelCanonicalizer::default_position_passes(),
            scorer,
        ))
    }
}

fn current_month(tz: Tz) -> (i32, u32) {
    let now = Utc::now().with_timezone(&tz);
    (now.year(), now.month())
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<String>,
    pub timezone: String,
    pub scorer: String,
    pub cleaning: CleaningStats,
    pub canonical_passes: Vec<CanonicalPass>,
    /// Position values rewritten by canonicalization.
    pub positions_canonicalized: usize,
    /// `None` when the export had no `messages.csv`.
    pub messages_loaded: Option<usize>,
    pub load_time_seconds: f64,
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_export`].
#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub metadata: AnalysisMetadata,
    pub overview: ConnectionOverview,
    /// Cleaned, canonicalized contacts in export order.
    pub contacts: Vec<ContactRecord>,
    pub companies: Vec<AggregationRow>,
    pub positions: Vec<AggregationRow>,
    pub top_companies: Vec<AggregationRow>,
    pub top_positions: Vec<AggregationRow>,
    pub company_network: GraphView,
    pub position_network: GraphView,
    pub timeline: Vec<DateCount>,
    pub cumulative: Vec<CumulativePoint>,
    pub weekdays: Vec<WeekdayCount>,
    pub email_directory: Vec<EmailContact>,
    pub company_tree: Vec<HierarchyNode>,
    pub position_tree: Vec<HierarchyNode>,
    pub position_keywords: Vec<AggregationRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chats: Option<ChatReport>,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the full pipeline over the export in `dir`.
///
/// 1. Load `Connections.csv` and, when present, `messages.csv`.
/// 2. Clean and canonicalize contacts.
/// 3. Aggregate, build networks and summary views.
pub fn analyze_export(
    dir: &Path,
    options: &AnalysisOptions,
    normalizer: &TextNormalizer,
) -> Result<InsightsReport> {
    let canonicalizer = options.canonicalizer()?;

    // ── Step 1: Load ──────────────────────────────────────────────────────────
    let load_start = Instant::now();
    let export = load_export(dir, &TimezoneHandler::new(options.timezone))?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Steps 2-3: Transform ──────────────────────────────────────────────────
    let mut report = build_report(export, options, &canonicalizer, normalizer)?;
    report.metadata.export_dir = Some(dir.display().to_string());
    report.metadata.load_time_seconds = load_time;
    Ok(report)
}

/// Transform already loaded export data into a report.
pub fn build_report(
    export: ExportData,
    options: &AnalysisOptions,
    canonicalizer: &LabelCanonicalizer,
    normalizer: &TextNormalizer,
) -> Result<InsightsReport> {
    let transform_start = Instant::now();

    let cleaned = clean(&export.contacts)?;
    let mut records = cleaned.records;
    let positions_canonicalized = canonicalizer.apply(&mut records, ContactField::Position);

    let companies = Aggregator::by_contact_field(&records, ContactField::Company);
    let positions = Aggregator::by_contact_field(&records, ContactField::Position);

    let company_network = build_graph(&records, &companies, &options.company_graph).to_view();
    let position_network = build_graph(&records, &positions, &options.position_graph).to_view();

    let overview = overview(
        export.contacts.len(),
        &records,
        &companies,
        &positions,
        options.reference_month,
    );
    let timeline = timeline(&records);
    let cumulative = cumulative(&timeline);

    let chats = export
        .messages
        .as_deref()
        .map(|messages| analyze_chats(messages, options.top_n));

    info!(
        "Analyzed {} contacts ({} companies, {} positions, {} canonicalized)",
        records.len(),
        companies.len(),
        positions.len(),
        positions_canonicalized
    );

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        export_dir: None,
        timezone: options.timezone.name().to_string(),
        scorer: options.scorer.clone(),
        cleaning: cleaned.stats,
        canonical_passes: canonicalizer.passes().to_vec(),
        positions_canonicalized,
        messages_loaded: export.messages.as_ref().map(Vec::len),
        load_time_seconds: 0.0,
        transform_time_seconds: 0.0,
    };

    let mut report = InsightsReport {
        metadata,
        overview,
        top_companies: Aggregator::top_n(&companies, options.top_n),
        top_positions: Aggregator::top_n(&positions, options.top_n),
        company_network,
        position_network,
        weekdays: weekday_histogram(&records),
        email_directory: email_directory(&records),
        company_tree: company_hierarchy(&records),
        position_tree: position_hierarchy(&records),
        position_keywords: Aggregator::top_n(&position_keywords(&records, normalizer), options.top_n),
        timeline,
        cumulative,
        companies,
        positions,
        contacts: records,
        chats,
    };
    report.metadata.transform_time_seconds = transform_start.elapsed().as_secs_f64();
    Ok(report)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
