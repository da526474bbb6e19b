mod bootstrap;
mod output;

use anyhow::Result;
use insights_core::settings::Settings;
use insights_core::text_processing::TextNormalizer;
use insights_data::analysis::{analyze_export, AnalysisOptions};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("LinkedIn Insights v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Export: {}, Timezone: {}, Scorer: {}",
        settings.export_dir.display(),
        settings.timezone,
        settings.scorer
    );

    let options = AnalysisOptions::from_settings(&settings)?;
    let report = analyze_export(
        &settings.export_dir,
        &options,
        TextNormalizer::shared_english(),
    )?;

    tracing::info!(
        "Loaded in {:.3}s, analyzed in {:.3}s",
        report.metadata.load_time_seconds,
        report.metadata.transform_time_seconds
    );

    output::emit_report(&report, settings.pretty, settings.output.as_deref())?;
    Ok(())
}
