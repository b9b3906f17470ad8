// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Bench instrument configuration

use serde::{Deserialize, Serialize};

/// Instrument-side settings shared by both characterization runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Settling delay after power-on, in milliseconds.
    ///
    /// The supply needs a few seconds before the first capture is
    /// trustworthy; the exact value is bench policy, not an analysis
    /// contract.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Generator common-mode offset in V, passed with every stimulus.
    #[serde(default = "default_common_mode")]
    pub common_mode: f64,

    /// Simulated-bench knobs, used when no hardware is attached.
    #[serde(default)]
    pub mock: MockConfig,
}

/// Tuning of the simulated converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// RMS noise per sample, in LSB.
    #[serde(default = "default_noise_lsb")]
    pub noise_lsb: f64,

    /// Static offset error of the simulated converter, in LSB.
    #[serde(default = "default_offset_error_lsb")]
    pub offset_error_lsb: f64,

    /// Noise seed; unset means clock-seeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_settle_ms() -> u64 {
    5000
}

fn default_common_mode() -> f64 {
    0.75
}

fn default_noise_lsb() -> f64 {
    0.5
}

fn default_offset_error_lsb() -> f64 {
    1.5
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            common_mode: default_common_mode(),
            mock: MockConfig::default(),
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            noise_lsb: default_noise_lsb(),
            offset_error_lsb: default_offset_error_lsb(),
            seed: None,
        }
    }
}
