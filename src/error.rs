// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types shared by the analysis pipelines
//!
//! Every analysis entry point validates its preconditions eagerly and fails
//! with one of these kinds instead of letting NaN or infinity leak into the
//! reported figures of merit. None of the failures is fatal: the caller may
//! re-acquire and rerun the whole pipeline.

use thiserror::Error;

/// Failures reported by the decoding, spectral and linearity pipelines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Malformed shapes, lengths or ordering supplied by the caller.
    ///
    /// This is a caller error; retrying the same call cannot succeed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A zero or negative power term would feed a logarithm.
    ///
    /// The capture is unusable for the requested figure of merit (for
    /// example an all-zero buffer has no signal power). The caller decides
    /// whether to re-acquire.
    #[error("degenerate signal: {0}")]
    DegenerateSignal(String),

    /// The acquisition returned fewer samples than requested.
    ///
    /// Partial buffers are never analyzed; retrying the capture is an
    /// instrument-side decision.
    #[error("incomplete capture: expected {expected} samples, got {actual}")]
    IncompleteCapture { expected: usize, actual: usize },
}

/// Convenience alias used throughout the analysis modules.
pub type Result<T> = std::result::Result<T, AnalysisError>;
