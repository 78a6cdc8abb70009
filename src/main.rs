mod cli;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cli::Cli;
use spectra::audio::decode;
use spectra::config;
use spectra::export::{self, csv, matrices, Record};
use spectra::{analyze, feature_names, Analysis};

type AnalysisResult = spectra::Result<Analysis>;

/// Sends the worker's result back; returns false if nobody is listening.
fn hand_off(tx: &mpsc::Sender<AnalysisResult>, result: AnalysisResult) -> bool {
    if tx.send(result).is_err() {
        log::warn!("Feature extraction finished but its result was not received");
        return false;
    }
    true
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect spectra.toml / user config
    let mut file_analysis = None;
    if let Some(path) = cli.config.clone().or_else(config::find_config) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            cli.merge_output(cfg.output);
            file_analysis = Some(cfg.analysis);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if cli.list_features {
        println!("Extracted features:");
        for name in feature_names() {
            println!("  {}", name);
        }
        return Ok(());
    }

    let input = cli.input.clone().context("Input audio file is required")?;
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }
    let analysis_config = cli.analysis_config(file_analysis.as_ref());

    log::info!("spectra - audio feature extractor");
    log::info!("Input: {}", input.display());
    log::info!("Category: {}", cli.category);

    // 1. Decode audio
    log::info!("Decoding audio...");
    let signal = decode::load_signal(&input)?;

    // 2. Extract features on a worker, one result handed back
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        hand_off(&tx, analyze(&signal, &analysis_config));
    });

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed_precise}] {msg}")?);
    pb.set_message("Extracting features...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = rx.recv();
    pb.finish_and_clear();
    worker
        .join()
        .map_err(|_| anyhow!("Feature extraction worker panicked"))?;
    let Analysis { features, matrices: mats } = result
        .context("Feature extraction worker exited without a result")?
        .context("Feature extraction failed")?;

    // 3. Report and export
    let record = Record::new(&input, cli.category, features);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&record.features)?);
    } else {
        println!("Key features:");
        print!("{}", export::render_table(&record));
    }

    let csv_path = cli
        .csv
        .clone()
        .or_else(|| cli.export.then(|| record.default_csv_path()));
    if let Some(path) = csv_path {
        csv::write_csv(&path, &record)
            .with_context(|| format!("Failed to export features to {}", path.display()))?;
    }
    if let Some(path) = cli.matrices.as_ref() {
        matrices::write_matrices(path, &mats)
            .with_context(|| format!("Failed to write matrices to {}", path.display()))?;
    }

    log::info!("Done!");
    Ok(())
}
