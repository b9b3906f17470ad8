// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-adc-characterization project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Static Linearity Module
//!
//! Integral and differential nonlinearity from a calibrated voltage-ramp
//! sweep. The pipeline runs through four phases in a fixed order, and the
//! types enforce it — each phase's output is the only way into the next:
//!
//! 1. **Calibrate** — [`CalibrationParams::from_captures`] derives the LSB
//!    offset and the conversion gain from two independent DC captures
//!    (zero stimulus and a known reference).
//! 2. **Sweep** — [`RampSweep::record_step`] applies the calibration
//!    per-sample, averages, and appends a [`RampStep`] in ascending voltage
//!    order. Ordering is semantically significant: DNL differences
//!    consecutive steps.
//! 3. **Fit** — [`RampSweep::fit`] runs an ordinary least-squares
//!    regression of corrected average code against applied voltage, giving
//!    the ideal transfer line.
//! 4. **Derive** — [`FittedSweep::derive`] turns per-step deviations from
//!    the fit into INL and consecutive-delta mismatches into DNL, with LSB
//!    normalization by `2^resolution − 1`.
//!
//! Calibration values live for exactly one characterization run; nothing is
//! shared across concurrent runs.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Offset/gain calibration derived once per characterization run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationParams {
    /// Offset in LSB: the negated average of the zero-stimulus capture.
    pub offset: f64,
    /// Conversion gain from the reference capture
    /// (reference volts per average LSB).
    pub gain: f64,
}

impl CalibrationParams {
    /// Derive calibration from two independent DC capture batches.
    ///
    /// `zero` is captured with no applied stimulus, `reference` with the
    /// known `reference_voltage` applied. Neither batch may be reused from
    /// the sweep itself.
    ///
    /// ### Errors
    ///
    /// `InvalidInput` if either capture is empty or the reference capture
    /// averages to zero (the gain division would be undefined).
    pub fn from_captures(zero: &[i32], reference: &[i32], reference_voltage: f64) -> Result<Self> {
        if zero.is_empty() || reference.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "calibration captures must not be empty".into(),
            ));
        }
        let offset = -mean(zero);
        let reference_average = mean(reference);
        if reference_average == 0.0 {
            return Err(AnalysisError::InvalidInput(
                "gain calibration average is zero".into(),
            ));
        }
        Ok(Self {
            offset,
            gain: reference_voltage / reference_average,
        })
    }

    /// Apply the calibration to one decoded code.
    pub fn correct(&self, code: i32) -> f64 {
        (code as f64 - self.offset) / self.gain
    }
}

/// One recorded point of the ramp sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RampStep {
    /// Applied voltage in V.
    pub voltage: f64,
    /// Average decoded code before calibration.
    pub raw_average: f64,
    /// Average of the per-sample calibrated codes.
    pub corrected_average: f64,
}

/// Ordered ramp sweep under construction (phase 2 of the pipeline).
#[derive(Debug, Clone)]
pub struct RampSweep {
    calibration: CalibrationParams,
    steps: Vec<RampStep>,
}

impl RampSweep {
    /// Start a sweep with the calibration derived in phase 1.
    pub fn new(calibration: CalibrationParams) -> Self {
        Self {
            calibration,
            steps: Vec::new(),
        }
    }

    /// Record one ramp step from its capture batch.
    ///
    /// Calibration is applied per sample before averaging. Steps must
    /// arrive in strictly increasing voltage order; anything else breaks
    /// the differencing contract of DNL and is rejected.
    pub fn record_step(&mut self, voltage: f64, samples: &[i32]) -> Result<()> {
        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput(format!(
                "ramp step at {} V has an empty capture",
                voltage
            )));
        }
        if let Some(last) = self.steps.last() {
            if voltage <= last.voltage {
                return Err(AnalysisError::InvalidInput(format!(
                    "voltage steps must be strictly increasing ({} V after {} V)",
                    voltage, last.voltage
                )));
            }
        }

        let raw_average = mean(samples);
        let corrected_average = samples
            .iter()
            .map(|&code| self.calibration.correct(code))
            .sum::<f64>()
            / samples.len() as f64;

        self.steps.push(RampStep {
            voltage,
            raw_average,
            corrected_average,
        });
        Ok(())
    }

    pub fn calibration(&self) -> &CalibrationParams {
        &self.calibration
    }

    pub fn steps(&self) -> &[RampStep] {
        &self.steps
    }

    /// Fit the ideal transfer line over all recorded steps (phase 3).
    ///
    /// Ordinary least squares of corrected average code against applied
    /// voltage. Fails with `InvalidInput` when fewer than two steps were
    /// recorded, since the regression is undefined.
    pub fn fit(self) -> Result<FittedSweep> {
        if self.steps.len() < 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "linear fit needs at least 2 sweep steps, got {}",
                self.steps.len()
            )));
        }

        let n = self.steps.len() as f64;
        let mean_v = self.steps.iter().map(|s| s.voltage).sum::<f64>() / n;
        let mean_c = self.steps.iter().map(|s| s.corrected_average).sum::<f64>() / n;

        let mut covariance = 0.0;
        let mut variance = 0.0;
        for step in &self.steps {
            let dv = step.voltage - mean_v;
            covariance += dv * (step.corrected_average - mean_c);
            variance += dv * dv;
        }
        // variance > 0 is guaranteed by the strictly-increasing step order
        let slope = covariance / variance;
        let intercept = mean_c - slope * mean_v;

        Ok(FittedSweep {
            calibration: self.calibration,
            steps: self.steps,
            fit: LinearFit { slope, intercept },
        })
    }
}

/// Ideal transfer line fitted across the sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Ideal corrected code at the given voltage.
    pub fn ideal(&self, voltage: f64) -> f64 {
        self.slope * voltage + self.intercept
    }
}

/// Completed sweep with its fitted transfer line (phase 3 output).
#[derive(Debug, Clone)]
pub struct FittedSweep {
    calibration: CalibrationParams,
    steps: Vec<RampStep>,
    fit: LinearFit,
}

impl FittedSweep {
    pub fn fit(&self) -> LinearFit {
        self.fit
    }

    pub fn steps(&self) -> &[RampStep] {
        &self.steps
    }

    pub fn calibration(&self) -> &CalibrationParams {
        &self.calibration
    }

    /// Derive INL and DNL from the fitted line (phase 4).
    ///
    /// INL at step i is the deviation of the corrected average from the
    /// ideal line. DNL at step i (i ≥ 1) is the mismatch between the actual
    /// and ideal consecutive-step deltas, so its sequence has exactly
    /// `steps − 1` entries, the first comparing steps 0 and 1. The `_lsb`
    /// variants divide by `2^resolution_bits − 1`.
    pub fn derive(&self, resolution_bits: u32) -> LinearityMetrics {
        let ideal: Vec<f64> = self.steps.iter().map(|s| self.fit.ideal(s.voltage)).collect();

        let inl: Vec<f64> = self
            .steps
            .iter()
            .zip(&ideal)
            .map(|(step, ideal)| step.corrected_average - ideal)
            .collect();

        let dnl: Vec<f64> = self
            .steps
            .windows(2)
            .zip(ideal.windows(2))
            .map(|(actual, ideal)| {
                (actual[1].corrected_average - actual[0].corrected_average)
                    - (ideal[1] - ideal[0])
            })
            .collect();

        let lsb_scale = ((1u64 << resolution_bits) - 1) as f64;
        LinearityMetrics {
            inl_lsb: inl.iter().map(|v| v / lsb_scale).collect(),
            dnl_lsb: dnl.iter().map(|v| v / lsb_scale).collect(),
            inl,
            dnl,
        }
    }
}

/// Per-step nonlinearity figures, in corrected code units and in LSB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearityMetrics {
    /// Integral nonlinearity per step (corrected − ideal).
    pub inl: Vec<f64>,
    /// Differential nonlinearity per consecutive step pair (`steps − 1`
    /// entries).
    pub dnl: Vec<f64>,
    /// INL normalized to LSB units.
    pub inl_lsb: Vec<f64>,
    /// DNL normalized to LSB units.
    pub dnl_lsb: Vec<f64>,
}

fn mean(samples: &[i32]) -> f64 {
    samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn exact_calibration() -> CalibrationParams {
        // offset 0, gain 1: corrected code equals decoded code
        CalibrationParams {
            offset: 0.0,
            gain: 1.0,
        }
    }

    #[test]
    fn offset_calibration_negates_the_zero_average() {
        let zero = vec![7; 100];
        let reference = vec![250; 100];
        let params = CalibrationParams::from_captures(&zero, &reference, 0.5).unwrap();
        assert_relative_eq!(params.offset, -7.0);
    }

    #[test]
    fn gain_calibration_divides_reference_voltage_by_average() {
        let zero = vec![0; 100];
        let reference = vec![250; 100];
        let params = CalibrationParams::from_captures(&zero, &reference, 0.5).unwrap();
        assert_relative_eq!(params.gain, 0.5 / 250.0);
    }

    #[test]
    fn zero_reference_average_is_rejected() {
        let zero = vec![0; 10];
        let reference = vec![1, -1, 1, -1];
        assert!(matches!(
            CalibrationParams::from_captures(&zero, &reference, 0.5),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_increasing_voltage_is_rejected() {
        let mut sweep = RampSweep::new(exact_calibration());
        sweep.record_step(0.0, &[0]).unwrap();
        sweep.record_step(0.1, &[10]).unwrap();
        assert!(matches!(
            sweep.record_step(0.1, &[10]),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            sweep.record_step(0.05, &[5]),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn fit_needs_two_steps() {
        let mut sweep = RampSweep::new(exact_calibration());
        sweep.record_step(0.0, &[0]).unwrap();
        assert!(matches!(
            sweep.fit(),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn perfect_line_fits_exactly() {
        // corrected_average = 2·voltage + 5, no noise
        let mut sweep = RampSweep::new(exact_calibration());
        for i in 0..20 {
            // voltages where 2·v + 5 is integral, so the code is exact
            let voltage = i as f64 * 0.5;
            let code = (2.0 * voltage + 5.0) as i32;
            sweep.record_step(voltage, &[code]).unwrap();
        }
        let fitted = sweep.fit().unwrap();
        assert_relative_eq!(fitted.fit().slope, 2.0, max_relative = 1e-9);
        assert_relative_eq!(fitted.fit().intercept, 5.0, max_relative = 1e-9);

        let metrics = fitted.derive(11);
        for inl in &metrics.inl {
            assert_abs_diff_eq!(*inl, 0.0, epsilon = 1e-9);
        }
        for dnl in &metrics.dnl {
            assert_abs_diff_eq!(*dnl, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn dnl_has_one_fewer_entry_than_steps() {
        let mut sweep = RampSweep::new(exact_calibration());
        let codes = [0, 3, 4, 9, 16];
        for (i, &code) in codes.iter().enumerate() {
            sweep.record_step(i as f64 * 0.1, &[code]).unwrap();
        }
        let fitted = sweep.fit().unwrap();
        let metrics = fitted.derive(11);

        assert_eq!(metrics.inl.len(), codes.len());
        assert_eq!(metrics.dnl.len(), codes.len() - 1);

        // First DNL entry compares steps 0 and 1
        let steps = fitted.steps();
        let ideal_delta = fitted.fit().ideal(steps[1].voltage) - fitted.fit().ideal(steps[0].voltage);
        let actual_delta = steps[1].corrected_average - steps[0].corrected_average;
        assert_relative_eq!(metrics.dnl[0], actual_delta - ideal_delta, max_relative = 1e-9);
    }

    #[test]
    fn lsb_normalization_divides_by_full_scale() {
        let mut sweep = RampSweep::new(exact_calibration());
        sweep.record_step(0.0, &[0]).unwrap();
        sweep.record_step(0.1, &[100]).unwrap();
        sweep.record_step(0.2, &[300]).unwrap();
        let metrics = sweep.fit().unwrap().derive(11);

        let scale = (1 << 11) as f64 - 1.0;
        for (raw, lsb) in metrics.inl.iter().zip(&metrics.inl_lsb) {
            assert_relative_eq!(raw / scale, *lsb, max_relative = 1e-12);
        }
        for (raw, lsb) in metrics.dnl.iter().zip(&metrics.dnl_lsb) {
            assert_relative_eq!(raw / scale, *lsb, max_relative = 1e-12);
        }
    }

    #[test]
    fn correction_is_applied_per_sample_before_averaging() {
        let calibration = CalibrationParams {
            offset: -2.0,
            gain: 0.5,
        };
        let mut sweep = RampSweep::new(calibration);
        sweep.record_step(0.0, &[10, 20]).unwrap();
        let step = sweep.steps()[0];
        assert_relative_eq!(step.raw_average, 15.0);
        // ((10 + 2) / 0.5 + (20 + 2) / 0.5) / 2
        assert_relative_eq!(step.corrected_average, 34.0);
    }
}
