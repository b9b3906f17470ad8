// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Configuration Management
//!
//! Configuration handling for the characterization bench: loading,
//! validating and saving YAML files, with command-line overrides applied on
//! top.
//!
//! The configuration is organized in sections:
//! - `adc`: code format and sampling setup of the converter under test
//! - `dynamic`: sine-wave test parameters
//! - `linearity`: calibration and ramp-sweep parameters
//! - `instrument`: settling delay, common-mode offset, simulated-bench knobs
//!
//! ## Usage
//!
//! ```no_run
//! use rust_adc_characterization::config::Config;
//! use std::path::Path;
//!
//! // Load config from file; a default file is created if none exists
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(Some(3000.0), Some(65536));
//!
//! println!("Capture length: {}", config.dynamic.sample_count);
//! ```

mod adc;
mod dynamic;
mod instrument;
mod linearity;

pub use adc::AdcConfig;
pub use dynamic::DynamicConfig;
pub use instrument::{InstrumentConfig, MockConfig};
pub use linearity::LinearityConfig;

use anyhow::{bail, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration of the characterization bench.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Converter-under-test description.
    #[serde(default)]
    pub adc: AdcConfig,

    /// Dynamic (sine-wave) test settings.
    #[serde(default)]
    pub dynamic: DynamicConfig,

    /// Static (ramp) test settings.
    #[serde(default)]
    pub linearity: LinearityConfig,

    /// Instrument-side settings.
    #[serde(default)]
    pub instrument: InstrumentConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// When the file does not exist, a default configuration is written to
    /// that path and returned, so a fresh checkout runs out of the box.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(
                "Configuration file {} not found, writing defaults",
                path.display()
            );
            let config = Config::default();
            config.save_to_file(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config: Config = serde_yml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a YAML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            serde_yml::to_string(self).context("Failed to serialize configuration")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file {}", path.display()))?;
        Ok(())
    }

    /// Apply command line overrides on top of the file values.
    pub fn apply_args(&mut self, frequency: Option<f64>, sample_count: Option<usize>) {
        if let Some(frequency) = frequency {
            self.dynamic.frequency = frequency;
        }
        if let Some(sample_count) = sample_count {
            self.dynamic.sample_count = sample_count;
        }
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.adc.value_bits == 0 || self.adc.value_bits > 30 {
            bail!("adc.value_bits must be between 1 and 30");
        }
        if self.adc.sign_bit_index < self.adc.value_bits {
            bail!("adc.sign_bit_index must lie above the magnitude field");
        }
        if self.adc.sample_rate <= 0.0 {
            bail!("adc.sample_rate must be positive");
        }
        if self.dynamic.frequency >= self.adc.sample_rate / 2.0 {
            bail!(
                "dynamic.frequency {} Hz violates Nyquist for a {} Hz sample rate",
                self.dynamic.frequency,
                self.adc.sample_rate
            );
        }
        if self.dynamic.kaiser_beta < 0.0 {
            bail!("dynamic.kaiser_beta must not be negative");
        }
        if self.linearity.reference_voltage == 0.0 {
            bail!("linearity.reference_voltage must not be zero");
        }
        if self.linearity.ramp_min >= self.linearity.ramp_max {
            bail!("linearity.ramp_min must be below linearity.ramp_max");
        }
        if self.linearity.step_count < 2 {
            bail!("linearity.step_count must be at least 2");
        }
        if self.linearity.samples_per_step == 0 || self.linearity.calibration_samples == 0 {
            bail!("linearity capture batch sizes must be positive");
        }
        Ok(())
    }
}
