// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the ADC characterization bench

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use rust_adc_characterization::characterization::{run_dynamic, run_static};
use rust_adc_characterization::config::Config;
use rust_adc_characterization::instrument::MockInstrument;

/// ADC dynamic and static performance characterization bench
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Directory the reports are written into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Stimulus frequency in Hz (overrides the configuration)
    #[arg(long)]
    frequency: Option<f64>,

    /// Capture length in samples (overrides the configuration)
    #[arg(long)]
    sample_count: Option<usize>,

    /// Skip the sine-wave dynamic test
    #[arg(long, default_value_t = false)]
    skip_dynamic: bool,

    /// Skip the ramp linearity test
    #[arg(long, default_value_t = false)]
    skip_static: bool,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    // Validate configuration file if --validate-config is set
    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }
        Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    let mut config = Config::from_file(&args.config)?;
    config.apply_args(args.frequency, args.sample_count);
    config.validate()?;

    let mut instrument = MockInstrument::new(
        config.adc.sample_rate,
        config.linearity.reference_voltage,
    )
    .with_code_format(config.adc.value_bits, config.adc.sign_bit_index)
    .with_noise_lsb(config.instrument.mock.noise_lsb)
    .with_offset_error_lsb(config.instrument.mock.offset_error_lsb);
    if let Some(seed) = config.instrument.mock.seed {
        instrument = instrument.with_seed(seed);
    }

    std::fs::create_dir_all(&args.output_dir)?;

    if !args.skip_dynamic {
        let report = run_dynamic(&mut instrument, &config)?;
        println!("Dynamic performance:");
        println!("  SNR:   {:>8.2} dB", report.metrics.snr_db);
        println!("  SINAD: {:>8.2} dB", report.metrics.sinad_db);
        println!("  THD:   {:>8.2} dB", report.metrics.thd_db);
        println!("  SFDR:  {:>8.2} dB", report.metrics.sfdr_db);
        println!("  ENOB:  {:>8.2} bits", report.metrics.enob_bits);

        let json_path = args.output_dir.join("dynamic_report.json");
        let csv_path = args.output_dir.join("spectrum.csv");
        report.write_json(&json_path)?;
        report.write_spectrum_csv(&csv_path)?;
        info!(
            "Dynamic report written to {} and {}",
            json_path.display(),
            csv_path.display()
        );
    }

    if !args.skip_static {
        let report = run_static(&mut instrument, &config)?;
        let worst_inl = report
            .metrics
            .inl_lsb
            .iter()
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        let worst_dnl = report
            .metrics
            .dnl_lsb
            .iter()
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        println!("Static performance:");
        println!("  Offset: {:>9.3} LSB", report.calibration.offset);
        println!("  Gain:   {:>9.6}", report.calibration.gain);
        println!("  Worst INL: {:>8.4} LSB", worst_inl);
        println!("  Worst DNL: {:>8.4} LSB", worst_dnl);

        let json_path = args.output_dir.join("static_report.json");
        let csv_path = args.output_dir.join("vramp_and_adc_data.csv");
        report.write_json(&json_path)?;
        report.write_ramp_csv(&csv_path)?;
        info!(
            "Static report written to {} and {}",
            json_path.display(),
            csv_path.display()
        );
    }

    Ok(())
}
