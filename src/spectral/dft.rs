// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Windowed DFT and half-spectrum folding
//!
//! The dynamic figures of merit are all derived from the discrete Fourier
//! transform of the windowed capture. The transform is computed over the
//! full buffer length (no zero padding, no segmentation): the harmonic
//! accounting indexes bins past Nyquist, so the complete complex spectrum is
//! kept and the non-redundant half is only folded out for reporting.

use num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Shortest capture the spectral pipeline accepts.
///
/// The harmonic accounting walks 19 wrapped bin indices; anything shorter
/// than 20 samples cannot give them distinct meaning.
pub const MIN_CAPTURE_LEN: usize = 20;

/// Folded single-sided spectrum: bin `i` sits at `i·Fs/N` Hz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectrum {
    /// Frequency axis in Hz, `N/2` entries from DC upward.
    pub frequencies: Vec<f64>,
    /// Magnitude (absolute value) of each retained bin.
    pub magnitudes: Vec<f64>,
}

/// Multiply the capture by its window and compute the full complex DFT.
///
/// The result keeps all `N` bins, DC at index 0 and the negative
/// frequencies in the upper half; callers that only need the single-sided
/// view fold it with [`fold_spectrum`].
///
/// ### Errors
///
/// `InvalidInput` if the window length differs from the capture length or
/// the capture is shorter than [`MIN_CAPTURE_LEN`].
pub fn compute_dft(samples: &[f64], window: &[f64]) -> Result<Vec<Complex<f64>>> {
    if samples.len() != window.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "window length {} does not match capture length {}",
            window.len(),
            samples.len()
        )));
    }
    if samples.len() < MIN_CAPTURE_LEN {
        return Err(AnalysisError::InvalidInput(format!(
            "capture of {} samples is below the minimum of {}",
            samples.len(),
            MIN_CAPTURE_LEN
        )));
    }

    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .zip(window)
        .map(|(&s, &w)| Complex::new(s * w, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    Ok(buffer)
}

/// Fold a full complex spectrum down to the non-redundant half.
///
/// For a real-valued capture the upper half mirrors the lower, so only bins
/// `[0, N/2)` are retained, with the frequency axis `i·Fs/N`.
pub fn fold_spectrum(dft: &[Complex<f64>], sample_rate: f64) -> Spectrum {
    let n = dft.len();
    let half = n / 2;
    let resolution = sample_rate / n as f64;
    Spectrum {
        frequencies: (0..half).map(|i| i as f64 * resolution).collect(),
        magnitudes: dft[..half].iter().map(|c| c.norm()).collect(),
    }
}
