// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Dynamic (sine-wave) test configuration

use serde::{Deserialize, Serialize};

/// Settings for the sine-wave dynamic performance test.
///
/// The stimulus frequency must satisfy Nyquist against the converter sample
/// rate; the default pairing (3 kHz tone, 24 414 Hz clock) is the wired
/// bench setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicConfig {
    /// Capture length in samples.
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Stimulus tone frequency in Hz.
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    /// Stimulus peak amplitude in V.
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    /// Kaiser window shape parameter.
    #[serde(default = "default_kaiser_beta")]
    pub kaiser_beta: f64,

    /// Override for the fundamental bin index.
    ///
    /// When unset, the analyzer uses the bench convention of one tenth of
    /// the capture length. Set this whenever the stimulus-to-sampling ratio
    /// deviates from that convention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundamental_index: Option<usize>,
}

fn default_sample_count() -> usize {
    100_000
}

fn default_frequency() -> f64 {
    3000.0
}

fn default_amplitude() -> f64 {
    0.5
}

fn default_kaiser_beta() -> f64 {
    14.0
}

impl Default for DynamicConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            frequency: default_frequency(),
            amplitude: default_amplitude(),
            kaiser_beta: default_kaiser_beta(),
            fundamental_index: None,
        }
    }
}
