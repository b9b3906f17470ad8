// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Window functions for spectral analysis
//!
//! Windowing tapers the capture at the frame edges and reduces the spectral
//! leakage that would otherwise smear the stimulus tone across neighboring
//! bins. The dynamic test bench runs with a Kaiser window at β = 14, whose
//! sidelobes sit low enough to keep the noise-decile bins free of leakage
//! from the fundamental; the rectangular window is kept for raw-DFT checks.
//!
//! A window always has exactly the length of the capture it multiplies.

use std::f64::consts::PI;

/// Window function applied to a capture before the DFT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowFunction {
    /// No windowing (all weights 1.0).
    Rectangular,
    /// Raised-cosine window, moderate sidelobe suppression.
    Hann,
    /// Kaiser-Bessel window with shape parameter β.
    Kaiser { beta: f64 },
}

impl WindowFunction {
    /// Generate the window weights for a capture of `len` samples.
    ///
    /// The weights are symmetric with a center value of 1.0 (exact for odd
    /// lengths). A zero-length request yields an empty window and a single
    /// point degenerates to 1.0.
    pub fn coefficients(&self, len: usize) -> Vec<f64> {
        if len == 0 {
            return Vec::new();
        }
        if len == 1 {
            return vec![1.0];
        }

        let n_minus_1 = (len - 1) as f64;
        match *self {
            WindowFunction::Rectangular => vec![1.0; len],
            WindowFunction::Hann => (0..len)
                .map(|i| {
                    let x = i as f64 / n_minus_1;
                    0.5 * (1.0 - (2.0 * PI * x).cos())
                })
                .collect(),
            WindowFunction::Kaiser { beta } => {
                let half = n_minus_1 / 2.0;
                let i0_beta = bessel_i0(beta);
                (0..len)
                    .map(|i| {
                        let x = (i as f64 - half) / half;
                        bessel_i0(beta * (1.0 - x * x).sqrt()) / i0_beta
                    })
                    .collect()
            }
        }
    }
}

/// Zeroth-order modified Bessel function of the first kind, I₀(x).
///
/// Polynomial approximation (Abramowitz & Stegun 9.8.1/9.8.2), accurate to
/// better than 2e-7 over both branches.
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let t = (x / 3.75).powi(2);
        1.0 + t
            * (3.5156229
                + t * (3.0899424
                    + t * (1.2067492 + t * (0.2659732 + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706
                                    + t * (0.02635537 + t * (-0.01647633 + t * 0.00392377))))))))
    }
}
