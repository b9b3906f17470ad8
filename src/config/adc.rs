// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Converter-under-test configuration

use serde::{Deserialize, Serialize};

/// Code format and sampling setup of the converter under test.
///
/// The default describes the 11-bit part of the bench: 10 magnitude bits,
/// sign at bit 10, sampled at 24 414 Hz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdcConfig {
    /// Width of the magnitude field in each raw code word.
    #[serde(default = "default_value_bits")]
    pub value_bits: u32,

    /// Bit index of the sign flag; must lie above the magnitude field.
    #[serde(default = "default_sign_bit_index")]
    pub sign_bit_index: u32,

    /// Converter resolution in bits (sign included); used for LSB
    /// normalization of INL/DNL.
    #[serde(default = "default_resolution_bits")]
    pub resolution_bits: u32,

    /// Sampling frequency in Hz (synchronous with the converter clock out).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
}

fn default_value_bits() -> u32 {
    10
}

fn default_sign_bit_index() -> u32 {
    10
}

fn default_resolution_bits() -> u32 {
    11
}

fn default_sample_rate() -> f64 {
    24_414.0
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            value_bits: default_value_bits(),
            sign_bit_index: default_sign_bit_index(),
            resolution_bits: default_resolution_bits(),
            sample_rate: default_sample_rate(),
        }
    }
}
