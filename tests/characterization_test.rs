//! Full characterization runs against the simulated bench.

use anyhow::Result;
use rust_adc_characterization::characterization::{run_dynamic, run_static};
use rust_adc_characterization::config::Config;
use rust_adc_characterization::instrument::MockInstrument;
use tempfile::tempdir;

/// Configuration sized for fast simulated runs (no settling delay).
fn test_config() -> Config {
    let mut config = Config::default();
    config.instrument.settle_ms = 0;
    config.instrument.mock.seed = Some(1234);
    config.dynamic.sample_count = 4096;
    config.linearity.step_count = 32;
    config.linearity.samples_per_step = 200;
    config.linearity.calibration_samples = 500;
    config
}

fn test_instrument(config: &Config) -> MockInstrument {
    MockInstrument::new(config.adc.sample_rate, config.linearity.reference_voltage)
        .with_code_format(config.adc.value_bits, config.adc.sign_bit_index)
        .with_noise_lsb(config.instrument.mock.noise_lsb)
        .with_offset_error_lsb(config.instrument.mock.offset_error_lsb)
        .with_seed(config.instrument.mock.seed.unwrap())
}

#[test]
fn dynamic_run_produces_finite_metrics() -> Result<()> {
    let config = test_config();
    let mut instrument = test_instrument(&config);

    let report = run_dynamic(&mut instrument, &config)?;

    assert_eq!(report.sample_count, 4096);
    assert_eq!(report.fundamental_index, 409);
    assert_eq!(report.spectrum.frequencies.len(), 2048);
    for value in [
        report.metrics.snr_db,
        report.metrics.thd_db,
        report.metrics.sinad_db,
        report.metrics.sfdr_db,
        report.metrics.enob_bits,
    ] {
        assert!(value.is_finite(), "non-finite figure of merit: {}", value);
    }
    // The simulated converter is clean: the tone towers over the noise
    // decile by far
    assert!(report.metrics.snr_db > 30.0);
    Ok(())
}

#[test]
fn static_run_recovers_the_simulated_transfer() -> Result<()> {
    let config = test_config();
    let mut instrument = test_instrument(&config);

    let report = run_static(&mut instrument, &config)?;

    // Offset calibration sees the simulated converter's static offset error
    let expected_offset = -config.instrument.mock.offset_error_lsb;
    assert!(
        (report.calibration.offset - expected_offset).abs() < 0.2,
        "offset calibration drifted: {}",
        report.calibration.offset
    );

    assert_eq!(report.steps.len(), 32);
    assert_eq!(report.metrics.inl.len(), 32);
    assert_eq!(report.metrics.dnl.len(), 31);
    assert_eq!(report.metrics.inl_lsb.len(), 32);
    assert_eq!(report.metrics.dnl_lsb.len(), 31);

    // Steps were recorded in ascending voltage order
    for pair in report.steps.windows(2) {
        assert!(pair[1].voltage > pair[0].voltage);
        assert!(pair[1].corrected_average > pair[0].corrected_average);
    }

    // The simulated transfer is linear, so the averaged residuals stay
    // small in LSB terms
    for inl in &report.metrics.inl_lsb {
        assert!(inl.abs() < 0.01, "INL out of range: {}", inl);
    }
    Ok(())
}

#[test]
fn runs_share_nothing_and_are_repeatable() -> Result<()> {
    let config = test_config();

    let first = run_static(&mut test_instrument(&config), &config)?;
    let second = run_static(&mut test_instrument(&config), &config)?;

    // Same seed, independent instruments: identical calibration and sweep
    assert_eq!(first.calibration.offset, second.calibration.offset);
    assert_eq!(first.calibration.gain, second.calibration.gain);
    assert_eq!(first.fit.slope, second.fit.slope);
    assert_eq!(first.metrics.inl, second.metrics.inl);
    Ok(())
}

#[test]
fn reports_round_trip_through_files() -> Result<()> {
    let config = test_config();
    let temp_dir = tempdir()?;

    let dynamic = run_dynamic(&mut test_instrument(&config), &config)?;
    let json_path = temp_dir.path().join("dynamic_report.json");
    dynamic.write_json(&json_path)?;
    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path)?)?;
    assert_eq!(parsed["sample_count"], 4096);
    assert!(parsed["metrics"]["snr_db"].is_number());

    let spectrum_path = temp_dir.path().join("spectrum.csv");
    dynamic.write_spectrum_csv(&spectrum_path)?;
    let spectrum_csv = std::fs::read_to_string(&spectrum_path)?;
    assert!(spectrum_csv.starts_with("Frequency [Hz],Magnitude"));
    assert_eq!(spectrum_csv.lines().count(), 2048 + 1);

    let static_report = run_static(&mut test_instrument(&config), &config)?;
    let ramp_path = temp_dir.path().join("vramp_and_adc_data.csv");
    static_report.write_ramp_csv(&ramp_path)?;
    let ramp_csv = std::fs::read_to_string(&ramp_path)?;
    assert!(ramp_csv.starts_with("Vramp,ADC Code,Ideal ADC Code"));
    assert_eq!(ramp_csv.lines().count(), 32 + 1);
    Ok(())
}

#[test]
fn stimulus_above_nyquist_is_rejected() {
    let mut config = test_config();
    config.dynamic.frequency = config.adc.sample_rate; // way past Nyquist
    let mut instrument = test_instrument(&config);
    assert!(run_dynamic(&mut instrument, &config).is_err());
}
