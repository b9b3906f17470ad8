// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Characterization run reports
//!
//! Results leave the bench as plain structured data: a timestamped JSON
//! record per run, plus CSV exports of the series downstream tooling plots
//! (folded spectrum for the dynamic run, ramp data for the static run).
//! No file format beyond these is defined here.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::linearity::{CalibrationParams, LinearFit, LinearityMetrics, RampStep};
use crate::spectral::{QualityMetrics, Spectrum};

/// Outcome of one dynamic (sine-wave) characterization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicReport {
    pub timestamp: DateTime<Utc>,
    /// Capture length in samples.
    pub sample_count: usize,
    /// Sampling frequency in Hz.
    pub sample_rate: f64,
    /// Stimulus tone frequency in Hz.
    pub stimulus_frequency: f64,
    /// Fundamental bin index the accounting used.
    pub fundamental_index: usize,
    /// The five figures of merit.
    pub metrics: QualityMetrics,
    /// Folded single-sided spectrum.
    pub spectrum: Spectrum,
}

impl DynamicReport {
    /// Write the full report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json(self, path)
    }

    /// Export the folded spectrum as `frequency,magnitude` rows.
    pub fn write_spectrum_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "Frequency [Hz],Magnitude")?;
        for (frequency, magnitude) in self
            .spectrum
            .frequencies
            .iter()
            .zip(&self.spectrum.magnitudes)
        {
            writeln!(writer, "{},{}", frequency, magnitude)?;
        }
        Ok(())
    }
}

/// Outcome of one static (ramp linearity) characterization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticReport {
    pub timestamp: DateTime<Utc>,
    /// Reference voltage the gain calibration used, in V.
    pub reference_voltage: f64,
    /// Converter resolution used for LSB normalization.
    pub resolution_bits: u32,
    /// Offset/gain calibration of this run.
    pub calibration: CalibrationParams,
    /// Fitted ideal transfer line.
    pub fit: LinearFit,
    /// Recorded sweep, in ascending voltage order.
    pub steps: Vec<RampStep>,
    /// Per-step INL/DNL, raw and LSB-normalized.
    pub metrics: LinearityMetrics,
}

impl StaticReport {
    /// Write the full report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json(self, path)
    }

    /// Export the ramp data with the bench's historical CSV layout.
    pub fn write_ramp_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "Vramp,ADC Code,Ideal ADC Code")?;
        for step in &self.steps {
            writeln!(
                writer,
                "{},{},{}",
                step.voltage,
                step.corrected_average,
                self.fit.ideal(step.voltage)
            )?;
        }
        Ok(())
    }
}

fn write_json<T: Serialize>(report: &T, path: &Path) -> Result<()> {
    let content =
        serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write report file {}", path.display()))?;
    Ok(())
}
