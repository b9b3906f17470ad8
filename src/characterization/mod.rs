// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Characterization run orchestration
//!
//! Ties the instrument collaborator to the two analysis pipelines. A run
//! brackets the bench with power-on → settle → capture → power-off; the
//! analysis itself stays pure over the captures. Runs are single-threaded
//! and share nothing: every static run derives its own calibration and step
//! sequence.
//!
//! The supply is switched off again even when a capture or an analysis step
//! fails mid-run.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::decoder::{CapturedBuffer, SampleDecoder};
use crate::error::AnalysisError;
use crate::instrument::{Instrument, Stimulus};
use crate::linearity::{CalibrationParams, RampSweep};
use crate::report::{DynamicReport, StaticReport};
use crate::spectral::{DynamicAnalyzer, WindowFunction};

/// Run the sine-wave dynamic test and compute the five figures of merit.
pub fn run_dynamic(instrument: &mut dyn Instrument, config: &Config) -> Result<DynamicReport> {
    let nyquist = config.adc.sample_rate / 2.0;
    if config.dynamic.frequency >= nyquist {
        return Err(AnalysisError::InvalidInput(format!(
            "stimulus frequency {} Hz is at or above Nyquist ({} Hz)",
            config.dynamic.frequency, nyquist
        ))
        .into());
    }

    instrument.power_on().context("Failed to power the bench on")?;
    settle(config.instrument.settle_ms);
    let outcome = dynamic_capture_and_analyze(instrument, config);
    instrument.power_off().context("Failed to power the bench off")?;
    outcome
}

fn dynamic_capture_and_analyze(
    instrument: &mut dyn Instrument,
    config: &Config,
) -> Result<DynamicReport> {
    info!(
        "Generating sine stimulus at {} Hz, capturing {} samples",
        config.dynamic.frequency, config.dynamic.sample_count
    );
    instrument.apply_stimulus(Stimulus::Sine {
        amplitude: config.dynamic.amplitude,
        offset: config.instrument.common_mode,
        frequency: config.dynamic.frequency,
    })?;

    let buffer = acquire_decoded(instrument, config, config.dynamic.sample_count)?;
    let window =
        WindowFunction::Kaiser {
            beta: config.dynamic.kaiser_beta,
        }
        .coefficients(buffer.len());

    let mut analyzer = DynamicAnalyzer::new();
    if let Some(index) = config.dynamic.fundamental_index {
        analyzer = analyzer.with_fundamental_index(index);
    }
    let (spectrum, metrics) = analyzer.quality_metrics(&buffer, &window)?;

    info!(
        "Dynamic run complete: SNR {:.2} dB, SINAD {:.2} dB, THD {:.2} dB, SFDR {:.2} dB, ENOB {:.2} bits",
        metrics.snr_db, metrics.sinad_db, metrics.thd_db, metrics.sfdr_db, metrics.enob_bits
    );

    Ok(DynamicReport {
        timestamp: Utc::now(),
        sample_count: buffer.len(),
        sample_rate: config.adc.sample_rate,
        stimulus_frequency: config.dynamic.frequency,
        fundamental_index: analyzer.fundamental_index(buffer.len()),
        metrics,
        spectrum,
    })
}

/// Run the calibrated ramp sweep and derive INL/DNL.
pub fn run_static(instrument: &mut dyn Instrument, config: &Config) -> Result<StaticReport> {
    if config.linearity.step_count < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "ramp sweep needs at least 2 steps, got {}",
            config.linearity.step_count
        ))
        .into());
    }

    instrument.power_on().context("Failed to power the bench on")?;
    settle(config.instrument.settle_ms);
    let outcome = static_capture_and_analyze(instrument, config);
    instrument.power_off().context("Failed to power the bench off")?;
    outcome
}

fn static_capture_and_analyze(
    instrument: &mut dyn Instrument,
    config: &Config,
) -> Result<StaticReport> {
    let calibration = calibrate(instrument, config)?;
    info!(
        "Calibration: offset {:.3} LSB, gain {:.6}",
        calibration.offset, calibration.gain
    );

    let mut sweep = RampSweep::new(calibration);
    for voltage in ramp_voltages(
        config.linearity.ramp_min,
        config.linearity.ramp_max,
        config.linearity.step_count,
    ) {
        debug!("Ramp step at {:.5} V", voltage);
        instrument.apply_stimulus(Stimulus::Dc {
            level: voltage,
            offset: config.instrument.common_mode,
        })?;
        let buffer = acquire_decoded(instrument, config, config.linearity.samples_per_step)?;
        sweep.record_step(voltage, buffer.samples())?;
    }

    let fitted = sweep.fit()?;
    let fit = fitted.fit();
    info!(
        "Transfer fit: slope {:.4} codes/V, intercept {:.4} codes",
        fit.slope, fit.intercept
    );
    let metrics = fitted.derive(config.adc.resolution_bits);

    Ok(StaticReport {
        timestamp: Utc::now(),
        reference_voltage: config.linearity.reference_voltage,
        resolution_bits: config.adc.resolution_bits,
        calibration: *fitted.calibration(),
        fit,
        steps: fitted.steps().to_vec(),
        metrics,
    })
}

/// Derive offset and gain from two independent DC capture batches.
fn calibrate(instrument: &mut dyn Instrument, config: &Config) -> Result<CalibrationParams> {
    info!("Calibrating offset (zero stimulus)");
    instrument.apply_stimulus(Stimulus::Dc {
        level: 0.0,
        offset: config.instrument.common_mode,
    })?;
    let zero = acquire_decoded(instrument, config, config.linearity.calibration_samples)?;

    info!(
        "Calibrating gain ({} V reference stimulus)",
        config.linearity.reference_voltage
    );
    instrument.apply_stimulus(Stimulus::Dc {
        level: config.linearity.reference_voltage,
        offset: config.instrument.common_mode,
    })?;
    let reference = acquire_decoded(instrument, config, config.linearity.calibration_samples)?;

    Ok(CalibrationParams::from_captures(
        zero.samples(),
        reference.samples(),
        config.linearity.reference_voltage,
    )?)
}

/// Acquire one capture batch and decode it, rejecting short reads.
fn acquire_decoded(
    instrument: &mut dyn Instrument,
    config: &Config,
    sample_count: usize,
) -> Result<CapturedBuffer> {
    let raw = instrument.acquire(sample_count)?;
    if raw.len() < sample_count {
        return Err(AnalysisError::IncompleteCapture {
            expected: sample_count,
            actual: raw.len(),
        }
        .into());
    }

    let decoder = SampleDecoder::new(config.adc.value_bits, config.adc.sign_bit_index)?;
    Ok(CapturedBuffer::new(
        decoder.decode_all(&raw),
        config.adc.sample_rate,
    ))
}

/// Evenly spaced ramp voltages in ascending order.
fn ramp_voltages(min: f64, max: f64, count: usize) -> impl Iterator<Item = f64> {
    let span = max - min;
    let last = (count - 1) as f64;
    (0..count).map(move |i| min + span * i as f64 / last)
}

fn settle(settle_ms: u64) {
    if settle_ms > 0 {
        info!("Waiting {} ms for the supply to settle", settle_ms);
        thread::sleep(Duration::from_millis(settle_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_voltages_are_strictly_increasing_and_span_the_range() {
        let voltages: Vec<f64> = ramp_voltages(-0.49, 0.49, 256).collect();
        assert_eq!(voltages.len(), 256);
        assert_eq!(voltages[0], -0.49);
        assert!((voltages[255] - 0.49).abs() < 1e-12);
        for pair in voltages.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }
}
