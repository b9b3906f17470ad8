//! End-to-end checks of the dynamic analysis pipeline on synthetic captures.

use approx::assert_relative_eq;
use rust_adc_characterization::decoder::{CapturedBuffer, SampleDecoder};
use rust_adc_characterization::error::AnalysisError;
use rust_adc_characterization::spectral::{enob, DynamicAnalyzer, WindowFunction};
use std::f64::consts::PI;

/// Sine capture with the tone on an exact bin.
///
/// The bench pairs a 3 kHz tone with a 24 414 Hz clock, putting the tone at
/// ~12.3% of the capture length: just above the conventional `N/10`
/// fundamental bin, and with its mirror image safely below the fixed noise
/// decile at `9N/10`.
fn tone_capture(n: usize, tone_bin: usize, amplitude: f64, sample_rate: f64) -> CapturedBuffer {
    let samples: Vec<i32> = (0..n)
        .map(|i| {
            let phase = 2.0 * PI * tone_bin as f64 * i as f64 / n as f64;
            (amplitude * phase.sin()).round() as i32
        })
        .collect();
    CapturedBuffer::new(samples, sample_rate)
}

#[test]
fn ramp_buffer_end_to_end_scenario() {
    // Capture [0, 1, ..., 99] at 1 kHz with a rectangular window: the
    // folded axis has 50 entries in 10 Hz steps and the analyzer's
    // conventional fundamental bin is 10.
    let buffer = CapturedBuffer::new((0..100).collect(), 1000.0);
    let window = WindowFunction::Rectangular.coefficients(100);
    let analyzer = DynamicAnalyzer::new();

    assert_eq!(analyzer.fundamental_index(buffer.len()), 10);

    let (spectrum, snr_db) = analyzer.snr(&buffer, &window).unwrap();
    assert_eq!(spectrum.frequencies.len(), 50);
    for (i, frequency) in spectrum.frequencies.iter().enumerate() {
        assert_relative_eq!(*frequency, i as f64 * 10.0, max_relative = 1e-12);
    }
    assert!(snr_db.is_finite());
}

#[test]
fn decoded_sine_capture_has_high_snr() {
    // Decode a synthetic raw capture first, as a bench run would
    let n = 2000;
    let tone_bin = 246.0; // the bench stimulus ratio
    let decoder = SampleDecoder::new(10, 10).unwrap();
    let raw: Vec<u32> = (0..n)
        .map(|i| {
            let value = 800.0 * (2.0 * PI * tone_bin * i as f64 / n as f64).sin();
            let code = value.round() as i32;
            if code < 0 {
                (1 << 10) | (-code as u32)
            } else {
                code as u32
            }
        })
        .collect();

    let buffer = CapturedBuffer::new(decoder.decode_all(&raw), 24_414.0);
    let window = WindowFunction::Kaiser { beta: 14.0 }.coefficients(n);
    let (_, metrics) = DynamicAnalyzer::new()
        .quality_metrics(&buffer, &window)
        .unwrap();

    assert!(metrics.snr_db > 50.0, "SNR too low: {}", metrics.snr_db);
    assert!(metrics.enob_bits > 8.0, "ENOB too low: {}", metrics.enob_bits);
    assert_relative_eq!(
        metrics.sinad_db,
        metrics.snr_db - metrics.thd_db,
        max_relative = 1e-12
    );
    assert_relative_eq!(metrics.enob_bits, enob(metrics.snr_db), max_relative = 1e-12);
}

#[test]
fn sinad_identity_holds_for_noisy_captures() {
    // A deliberately dirty capture: a tone on the conventional fundamental
    // bin N/10 plus a strong third harmonic
    let n = 1000;
    let f0 = n / 10;
    let samples: Vec<i32> = (0..n)
        .map(|i| {
            let phase = 2.0 * PI * f0 as f64 * i as f64 / n as f64;
            (400.0 * phase.sin() + 40.0 * (3.0 * phase).sin()).round() as i32
        })
        .collect();
    let buffer = CapturedBuffer::new(samples, 10_000.0);
    let window = WindowFunction::Kaiser { beta: 14.0 }.coefficients(n);
    let analyzer = DynamicAnalyzer::new();

    let (_, snr_db) = analyzer.snr(&buffer, &window).unwrap();
    let thd_db = analyzer.thd(&buffer, &window).unwrap();
    assert_relative_eq!(
        analyzer.sinad(&buffer, &window).unwrap(),
        snr_db - thd_db,
        max_relative = 1e-12
    );

    // The injected harmonic dominates the distortion sum, so THD sits well
    // above the clean-capture floor
    let clean = tone_capture(n, f0, 400.0, 10_000.0);
    let clean_thd = analyzer.thd(&clean, &window).unwrap();
    assert!(thd_db > clean_thd + 20.0);
}

#[test]
fn snr_grows_with_amplitude() {
    let window = WindowFunction::Kaiser { beta: 14.0 }.coefficients(1000);
    let analyzer = DynamicAnalyzer::new();

    let mut previous = f64::NEG_INFINITY;
    for amplitude in [50.0, 200.0, 800.0] {
        let buffer = tone_capture(1000, 123, amplitude, 10_000.0);
        let (_, snr_db) = analyzer.snr(&buffer, &window).unwrap();
        assert!(
            snr_db > previous,
            "SNR did not grow: {} after {}",
            snr_db,
            previous
        );
        previous = snr_db;
    }
}

#[test]
fn degenerate_capture_is_reported_not_propagated() {
    let buffer = CapturedBuffer::new(vec![0; 400], 10_000.0);
    let window = WindowFunction::Kaiser { beta: 14.0 }.coefficients(400);
    let analyzer = DynamicAnalyzer::new();

    for result in [
        analyzer.snr(&buffer, &window).map(|(_, db)| db),
        analyzer.thd(&buffer, &window),
        analyzer.sfdr(&buffer, &window),
    ] {
        match result {
            Err(AnalysisError::DegenerateSignal(_)) => {}
            other => panic!("expected DegenerateSignal, got {:?}", other),
        }
    }
}

#[test]
fn mismatched_window_is_invalid_input() {
    let buffer = tone_capture(500, 61, 300.0, 10_000.0);
    let window = WindowFunction::Kaiser { beta: 14.0 }.coefficients(501);
    match DynamicAnalyzer::new().snr(&buffer, &window) {
        Err(AnalysisError::InvalidInput(_)) => {}
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}
