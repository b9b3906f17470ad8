// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Spectral Analysis Module
//!
//! Dynamic ADC characterization from a captured sine-wave response. The
//! pipeline is: window the decoded capture, compute the full complex DFT,
//! then account signal, noise, harmonic and spur powers into the five
//! figures of merit (SNR, THD, SINAD, SFDR, ENOB).
//!
//! ## Architecture
//!
//! - [`window`] generates the window weights (Kaiser β = 14 for bench runs)
//! - [`dft`] computes the windowed transform and folds the reporting half
//! - [`metrics`] holds [`DynamicAnalyzer`] with the bin-accounting
//!   conventions of the test bench
//!
//! Every operation is a pure function over a [`CapturedBuffer`](crate::decoder::CapturedBuffer)
//! and a window; no instrument state is owned here.
//!
//! ## Usage
//!
//! ```
//! use rust_adc_characterization::decoder::CapturedBuffer;
//! use rust_adc_characterization::spectral::{DynamicAnalyzer, WindowFunction};
//!
//! let n = 1000;
//! // 3 kHz tone at the 24 414 Hz bench clock: ~12.3% of the capture length
//! let samples: Vec<i32> = (0..n)
//!     .map(|i| {
//!         let phase = 2.0 * std::f64::consts::PI * 123.0 * i as f64 / n as f64;
//!         (400.0 * phase.sin()).round() as i32
//!     })
//!     .collect();
//! let buffer = CapturedBuffer::new(samples, 24_414.0);
//! let window = WindowFunction::Kaiser { beta: 14.0 }.coefficients(n);
//!
//! let (spectrum, metrics) = DynamicAnalyzer::new()
//!     .quality_metrics(&buffer, &window)
//!     .unwrap();
//! println!("SNR {:.2} dB, ENOB {:.2} bits", metrics.snr_db, metrics.enob_bits);
//! println!("{} folded bins", spectrum.frequencies.len());
//! ```

pub mod dft;
pub mod metrics;
pub mod window;

pub use dft::{compute_dft, fold_spectrum, Spectrum, MIN_CAPTURE_LEN};
pub use metrics::{enob, DynamicAnalyzer, QualityMetrics, HARMONIC_COUNT};
pub use window::WindowFunction;
