// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Mock bench instrument
//!
//! Simulated waveform generator and 11-bit sign-magnitude converter behind
//! the [`Instrument`](super::Instrument) trait, for running complete
//! characterization passes without hardware. The converter transfer is
//! ideal (`code = v · full_scale / reference_voltage`) plus a configurable
//! static offset error and white Gaussian noise in LSB units, clamped to
//! full scale and encoded exactly the way the acquisition hardware packs
//! codes.

use anyhow::{bail, Result};
use log::debug;

use super::{Instrument, Stimulus};
use crate::utility::noise_generator::NoiseGenerator;

/// Simulated bench: generator, supply and converter in one.
pub struct MockInstrument {
    sample_rate: f64,
    reference_voltage: f64,
    value_bits: u32,
    sign_bit_index: u32,
    noise_lsb: f64,
    offset_error_lsb: f64,
    generator: NoiseGenerator,
    powered: bool,
    stimulus: Option<Stimulus>,
    // sample index, continuous across captures so sine phase carries over
    cursor: u64,
}

impl MockInstrument {
    /// Simulated converter sampling at `sample_rate` with `reference_voltage`
    /// mapping to positive full scale.
    ///
    /// Defaults: 10 magnitude bits with the sign at bit 10, 0.5 LSB rms
    /// noise, 1.5 LSB static offset error, clock-seeded noise.
    pub fn new(sample_rate: f64, reference_voltage: f64) -> Self {
        debug!("Creating MockInstrument:");
        debug!("  Sample rate: {} Hz", sample_rate);
        debug!("  Reference voltage: {} V", reference_voltage);
        Self {
            sample_rate,
            reference_voltage,
            value_bits: 10,
            sign_bit_index: 10,
            noise_lsb: 0.5,
            offset_error_lsb: 1.5,
            generator: NoiseGenerator::new_from_system_time(),
            powered: false,
            stimulus: None,
            cursor: 0,
        }
    }

    /// Change the code word layout.
    pub fn with_code_format(mut self, value_bits: u32, sign_bit_index: u32) -> Self {
        self.value_bits = value_bits;
        self.sign_bit_index = sign_bit_index;
        self
    }

    /// RMS noise added to every sample, in LSB.
    pub fn with_noise_lsb(mut self, noise_lsb: f64) -> Self {
        self.noise_lsb = noise_lsb;
        self
    }

    /// Static offset error of the converter, in LSB.
    pub fn with_offset_error_lsb(mut self, offset_error_lsb: f64) -> Self {
        self.offset_error_lsb = offset_error_lsb;
        self
    }

    /// Seed the noise source for reproducible captures.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.generator = NoiseGenerator::new(seed);
        self
    }

    fn full_scale(&self) -> f64 {
        ((1u32 << self.value_bits) - 1) as f64
    }

    /// Generator output voltage at sample `index`.
    ///
    /// The generator common-mode offset never reaches the converter input
    /// (the front end is differential), so only amplitude, frequency and DC
    /// level matter here.
    fn instantaneous_voltage(&self, index: u64) -> f64 {
        match self.stimulus {
            Some(Stimulus::Sine {
                amplitude,
                frequency,
                ..
            }) => {
                let t = index as f64 / self.sample_rate;
                amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin()
            }
            Some(Stimulus::Dc { level, .. }) => level,
            None => 0.0,
        }
    }

    /// Quantize a voltage into a raw sign-magnitude code word.
    fn encode(&mut self, voltage: f64) -> u32 {
        let gain = self.full_scale() / self.reference_voltage;
        let ideal = voltage * gain + self.offset_error_lsb;
        let noisy = ideal + self.noise_lsb * self.generator.next_gaussian();
        let code = noisy.round().clamp(-self.full_scale(), self.full_scale()) as i64;

        if code < 0 {
            (1 << self.sign_bit_index) | (-code as u32)
        } else {
            code as u32
        }
    }
}

impl Instrument for MockInstrument {
    fn power_on(&mut self) -> Result<()> {
        debug!("Mock supply enabled");
        self.powered = true;
        Ok(())
    }

    fn power_off(&mut self) -> Result<()> {
        debug!("Mock supply disabled");
        self.powered = false;
        self.stimulus = None;
        Ok(())
    }

    fn apply_stimulus(&mut self, stimulus: Stimulus) -> Result<()> {
        debug!("Mock stimulus applied: {:?}", stimulus);
        self.stimulus = Some(stimulus);
        Ok(())
    }

    fn acquire(&mut self, sample_count: usize) -> Result<Vec<u32>> {
        if !self.powered {
            bail!("acquisition requested while the supply is off");
        }
        let mut capture = Vec::with_capacity(sample_count);
        for _ in 0..sample_count {
            let voltage = self.instantaneous_voltage(self.cursor);
            capture.push(self.encode(voltage));
            self.cursor += 1;
        }
        Ok(capture)
    }
}
