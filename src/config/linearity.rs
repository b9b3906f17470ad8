// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Static (ramp) test configuration

use serde::{Deserialize, Serialize};

/// Settings for the calibrated voltage-ramp linearity test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearityConfig {
    /// Known reference voltage used for gain calibration, in V.
    #[serde(default = "default_reference_voltage")]
    pub reference_voltage: f64,

    /// First ramp voltage, in V.
    #[serde(default = "default_ramp_min")]
    pub ramp_min: f64,

    /// Last ramp voltage, in V. Must stay within the reference range.
    #[serde(default = "default_ramp_max")]
    pub ramp_max: f64,

    /// Number of evenly spaced ramp steps between `ramp_min` and
    /// `ramp_max`, applied in ascending order.
    #[serde(default = "default_step_count")]
    pub step_count: usize,

    /// Samples captured and averaged at each ramp step.
    #[serde(default = "default_samples_per_step")]
    pub samples_per_step: usize,

    /// Samples captured for each of the two calibration batches.
    #[serde(default = "default_calibration_samples")]
    pub calibration_samples: usize,
}

fn default_reference_voltage() -> f64 {
    0.5
}

fn default_ramp_min() -> f64 {
    -0.49
}

fn default_ramp_max() -> f64 {
    0.49
}

fn default_step_count() -> usize {
    256
}

fn default_samples_per_step() -> usize {
    1000
}

fn default_calibration_samples() -> usize {
    1000
}

impl Default for LinearityConfig {
    fn default() -> Self {
        Self {
            reference_voltage: default_reference_voltage(),
            ramp_min: default_ramp_min(),
            ramp_max: default_ramp_max(),
            step_count: default_step_count(),
            samples_per_step: default_samples_per_step(),
            calibration_samples: default_calibration_samples(),
        }
    }
}
