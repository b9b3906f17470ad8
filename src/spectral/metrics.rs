// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Dynamic figures of merit derived from the windowed DFT
//!
//! This module reproduces the sine-wave test bench conventions of the
//! characterization setup:
//!
//! - The **fundamental bin** is fixed at `N/10` by convention: the stimulus
//!   frequency is chosen as a tenth of the capture rate, so the tone lands
//!   on that bin. This is *not* a peak search. The index is exposed as an
//!   overridable parameter because the convention silently breaks whenever
//!   the capture length or the stimulus ratio changes.
//! - **Noise power** is estimated as the mean squared magnitude over the top
//!   decile of bins `[9N/10, N)`, a fixed "noise floor" window in the
//!   negative-frequency half of the spectrum. Note that the decile boundary
//!   coincides with the mirror image of a tone sitting exactly on bin
//!   `N/10`; the wired stimulus ratio (≈ 0.123·Fs) keeps the image just
//!   below the window, which is part of why the convention is fragile.
//! - **Harmonic bins** wrap modulo `N`: harmonic k sits at
//!   `((k+1)·f₀) mod N`, which deliberately aliases harmonics past Nyquist
//!   back onto low-frequency bins. The wrap is kept exactly for
//!   compatibility with the recorded bench results.
//! - **SFDR** approximates the largest spur as the global peak power minus
//!   the fundamental power. This upper bound is not a true second-peak
//!   search; it is kept as-is and documented as an approximation.
//!
//! All operations are pure over a decoded capture and its window; any zero
//! or negative power term is reported as a degenerate signal instead of
//! propagating NaN or infinity.

use serde::{Deserialize, Serialize};

use crate::decoder::CapturedBuffer;
use crate::error::{AnalysisError, Result};
use crate::spectral::dft::{compute_dft, fold_spectrum, Spectrum};

/// Number of harmonics accumulated into the distortion power.
pub const HARMONIC_COUNT: usize = 19;

/// Dynamic performance record for one capture.
///
/// All values are in dB except `enob_bits`. The record is derived, never
/// stored independently: it is recomputed for every capture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Signal-to-noise ratio in dB.
    pub snr_db: f64,
    /// Total harmonic distortion in dB.
    pub thd_db: f64,
    /// Signal-to-noise-and-distortion ratio in dB (SNR − THD).
    pub sinad_db: f64,
    /// Spurious-free dynamic range in dB.
    pub sfdr_db: f64,
    /// Effective number of bits.
    pub enob_bits: f64,
}

/// Spectral analyzer for the sine-wave dynamic test.
///
/// ### Example
///
/// ```
/// use rust_adc_characterization::decoder::CapturedBuffer;
/// use rust_adc_characterization::spectral::{DynamicAnalyzer, WindowFunction};
///
/// // 3 kHz tone sampled at 24 414 Hz, the wired bench pairing: the tone
/// // sits at ~12.3% of the capture length, just above the conventional
/// // N/10 bin and safely below the fixed noise decile's mirror image.
/// let n = 2000;
/// let tone_bin = 246.0;
/// let samples: Vec<i32> = (0..n)
///     .map(|i| {
///         let phase = 2.0 * std::f64::consts::PI * tone_bin * i as f64 / n as f64;
///         (500.0 * phase.sin()).round() as i32
///     })
///     .collect();
/// let buffer = CapturedBuffer::new(samples, 24_414.0);
/// let window = WindowFunction::Kaiser { beta: 14.0 }.coefficients(n);
///
/// let analyzer = DynamicAnalyzer::new();
/// let (_spectrum, snr_db) = analyzer.snr(&buffer, &window).unwrap();
/// assert!(snr_db > 40.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicAnalyzer {
    fundamental_index: Option<usize>,
}

impl DynamicAnalyzer {
    /// Analyzer using the bench convention `fundamental = N/10`.
    pub fn new() -> Self {
        Self {
            fundamental_index: None,
        }
    }

    /// Override the fundamental bin index.
    ///
    /// Use this when the stimulus-to-sampling ratio differs from the wired
    /// one-tenth convention.
    pub fn with_fundamental_index(mut self, index: usize) -> Self {
        self.fundamental_index = Some(index);
        self
    }

    /// Fundamental bin index for a capture of `n` samples.
    pub fn fundamental_index(&self, n: usize) -> usize {
        self.fundamental_index.unwrap_or(n / 10)
    }

    /// Signal-to-noise ratio in dB, along with the folded spectrum.
    ///
    /// Signal power is the squared maximum magnitude across the full
    /// unfolded spectrum; noise power is the mean squared magnitude over
    /// the top decile of bins.
    pub fn snr(&self, buffer: &CapturedBuffer, window: &[f64]) -> Result<(Spectrum, f64)> {
        let dft = compute_dft(&buffer.to_f64(), window)?;
        let spectrum = fold_spectrum(&dft, buffer.sample_rate());
        let n = dft.len();

        let signal_power = dft
            .iter()
            .map(|c| c.norm_sqr())
            .fold(f64::NEG_INFINITY, f64::max);
        let noise_band = &dft[9 * n / 10..];
        let noise_power =
            noise_band.iter().map(|c| c.norm_sqr()).sum::<f64>() / noise_band.len() as f64;

        let snr_db = power_ratio_db(signal_power, noise_power, "signal", "noise")?;
        Ok((spectrum, snr_db))
    }

    /// Total harmonic distortion in dB.
    ///
    /// Sums the squared magnitudes of the first [`HARMONIC_COUNT`] harmonics
    /// at their wrapped bin indices and relates them to the fundamental
    /// power.
    pub fn thd(&self, buffer: &CapturedBuffer, window: &[f64]) -> Result<f64> {
        let dft = compute_dft(&buffer.to_f64(), window)?;
        let n = dft.len();
        let fundamental = self.checked_fundamental(n)?;

        let fundamental_power = dft[fundamental].norm_sqr();
        let distortion_power: f64 = harmonic_indices(fundamental, n)
            .map(|bin| dft[bin].norm_sqr())
            .sum();

        power_ratio_db(distortion_power, fundamental_power, "distortion", "fundamental")
    }

    /// Signal-to-noise-and-distortion ratio in dB.
    ///
    /// Defined as SNR − THD, each computed independently; there is no
    /// separate spectral pass.
    pub fn sinad(&self, buffer: &CapturedBuffer, window: &[f64]) -> Result<f64> {
        let (_, snr_db) = self.snr(buffer, window)?;
        let thd_db = self.thd(buffer, window)?;
        Ok(snr_db - thd_db)
    }

    /// Spurious-free dynamic range in dB.
    ///
    /// The spur power is approximated as the global peak power minus the
    /// fundamental power — an upper bound, not a second-peak search. A
    /// capture whose only energy is the fundamental therefore reports a
    /// degenerate signal rather than an infinite range.
    pub fn sfdr(&self, buffer: &CapturedBuffer, window: &[f64]) -> Result<f64> {
        let dft = compute_dft(&buffer.to_f64(), window)?;
        let fundamental = self.checked_fundamental(dft.len())?;

        let fundamental_power = dft[fundamental].norm_sqr();
        let peak_power = dft
            .iter()
            .map(|c| c.norm_sqr())
            .fold(f64::NEG_INFINITY, f64::max);
        let max_spurious_power = peak_power - fundamental_power;

        power_ratio_db(fundamental_power, max_spurious_power, "fundamental", "spur")
    }

    /// All five figures of merit plus the folded spectrum for reporting.
    pub fn quality_metrics(
        &self,
        buffer: &CapturedBuffer,
        window: &[f64],
    ) -> Result<(Spectrum, QualityMetrics)> {
        let (spectrum, snr_db) = self.snr(buffer, window)?;
        let thd_db = self.thd(buffer, window)?;
        let sfdr_db = self.sfdr(buffer, window)?;
        Ok((
            spectrum,
            QualityMetrics {
                snr_db,
                thd_db,
                sinad_db: snr_db - thd_db,
                sfdr_db,
                enob_bits: enob(snr_db),
            },
        ))
    }

    fn checked_fundamental(&self, n: usize) -> Result<usize> {
        let fundamental = self.fundamental_index(n);
        if fundamental == 0 || fundamental >= n {
            return Err(AnalysisError::InvalidInput(format!(
                "fundamental bin {} is outside the {}-bin spectrum",
                fundamental, n
            )));
        }
        Ok(fundamental)
    }
}

/// Effective number of bits from an SNR in dB: `(SNR − 1.76) / 6.02`.
///
/// Applied without clamping, negative results included.
pub fn enob(snr_db: f64) -> f64 {
    (snr_db - 1.76) / 6.02
}

/// Wrapped bin indices of harmonics 2 through 20 for a fundamental at `f0`.
fn harmonic_indices(f0: usize, n: usize) -> impl Iterator<Item = usize> {
    (1..=HARMONIC_COUNT).map(move |k| (k + 1) * f0 % n)
}

fn power_ratio_db(numerator: f64, denominator: f64, num_name: &str, den_name: &str) -> Result<f64> {
    if !(numerator > 0.0) {
        return Err(AnalysisError::DegenerateSignal(format!(
            "{} power is not positive ({})",
            num_name, numerator
        )));
    }
    if !(denominator > 0.0) {
        return Err(AnalysisError::DegenerateSignal(format!(
            "{} power is not positive ({})",
            den_name, denominator
        )));
    }
    Ok(10.0 * (numerator / denominator).log10())
}
