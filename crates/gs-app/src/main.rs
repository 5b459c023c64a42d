use anyhow::Result;
use clap::Parser;
use gs_audio::analyzer::GrainAnalyzer;
use gs_audio::decode::decode_file;
use gs_audio::segment::segment;
use gs_core::config::{AnalysisConfig, load_config};

pub mod cli;
pub mod report;

use cli::{Cli, OutputFormat};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, appliquer les overrides, valider
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    // 4. Décoder
    let signal = decode_file(&cli.input)?;
    let sample_rate = config.sample_rate.unwrap_or_else(|| signal.sample_rate());

    // 5. Segmenter puis analyser
    let mut grains = segment(&signal, config.grain_length_ms, sample_rate);
    if grains.is_empty() {
        log::warn!(
            "Aucun grain produit (grain_length_ms = {}, sample rate = {sample_rate})",
            config.grain_length_ms
        );
    }
    let features = config.requested_features();
    GrainAnalyzer::analyze_all(&mut grains, &features, config.rolloff_percentile);

    // 6. Sortie
    let output = match cli.format {
        OutputFormat::Table => report::table(&grains, &features),
        OutputFormat::Json => report::json(
            &grains,
            &report::RunInfo {
                sample_rate,
                grain_length_ms: config.grain_length_ms,
                rolloff_percentile: config.rolloff_percentile,
            },
        )?,
        OutputFormat::Points => report::points(&config.layout().project(&grains)),
    };
    print!("{output}");

    Ok(())
}

/// Load `--config` if it exists, defaults otherwise.
fn resolve_config(cli: &Cli) -> Result<AnalysisConfig> {
    if cli.config.exists() {
        load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(AnalysisConfig::default())
    }
}
