//! Integration Tests
//!
//! End-to-end tests for the decode → perturb → encode pipeline.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use soundshift::config::{OutputSettings, StageConfig};
use soundshift::dsp::{FixedSource, RngSource, StageOutcome};
use soundshift::engine::{decode, process_file, OutputFormat};
use soundshift::PerturbationParams;
use tempfile::tempdir;

/// Write a 16-bit WAV fixture with hound
fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Stereo sine fixture, one frequency per channel
fn sine_samples(frames: usize, sample_rate: u32) -> Vec<i16> {
    let mut samples = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        samples.push((12000.0 * (2.0 * std::f64::consts::PI * 440.0 * t).sin()) as i16);
        samples.push((9000.0 * (2.0 * std::f64::consts::PI * 660.0 * t).sin()) as i16);
    }
    samples
}

// === End-to-End Tests ===

#[test]
fn test_silent_input_stays_quiet() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("silence.wav");
    let output = dir.path().join("silence_out.wav");
    write_wav(&input, 1, 44100, &vec![0i16; 44100]);

    let params = PerturbationParams {
        stages: vec![
            StageConfig::Noise { fraction: 0.0005 },
            StageConfig::Volume {
                min_scale: 1.0,
                max_scale: 1.0,
            },
        ],
        output: OutputSettings {
            format: OutputFormat::Wav,
            bitrate: Some("192k".to_string()),
        },
    };

    let report = process_file(&input, &output, &params, &mut RngSource::seeded(1)).unwrap();
    assert_eq!(report.stages[1], StageOutcome::Volume { scale: 1.0 });

    let source = decode(&input).unwrap();
    let result = decode(&output).unwrap();
    assert_eq!(result.num_channels(), 1);
    assert_eq!(result.frame_rate(), 44100);
    assert!((result.duration_secs() - source.duration_secs()).abs() < 1e-9);
    assert!(result.peak() < 200, "peak was {}", result.peak());
}

#[test]
fn test_two_runs_differ_in_bytes_not_format() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    write_wav(&input, 2, 44100, &sine_samples(22050, 44100));

    let params = PerturbationParams::simplified();
    let first = dir.path().join("first.wav");
    let second = dir.path().join("second.wav");

    let a = process_file(&input, &first, &params, &mut RngSource::seeded(100)).unwrap();
    let b = process_file(&input, &second, &params, &mut RngSource::seeded(200)).unwrap();

    assert_ne!(a.digest, b.digest);
    assert_ne!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());

    let first = decode(&first).unwrap();
    let second = decode(&second).unwrap();
    assert!(first.same_format(&second));
    assert_eq!(first.num_frames(), second.num_frames());
    assert_eq!(first.num_frames(), 22050);
}

#[test]
fn test_full_preset_writes_flac_with_scaled_length() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let output = dir.path().join("tone.flac");
    write_wav(&input, 2, 44100, &sine_samples(44100, 44100));

    let report = process_file(
        &input,
        &output,
        &PerturbationParams::full(),
        &mut RngSource::seeded(7),
    )
    .unwrap();

    let ratio = report
        .stages
        .iter()
        .find_map(|s| match s {
            StageOutcome::Pitch { ratio } => Some(*ratio),
            _ => None,
        })
        .expect("pitch stage should run on a one second file");
    assert!((0.99..=1.01).contains(&ratio));

    let result = decode(&output).unwrap();
    assert_eq!(result.num_channels(), 2);
    assert_eq!(result.frame_rate(), 44100);
    assert_eq!(result.bits_per_sample(), 16);
    assert_eq!(result.num_frames(), (44100.0 * ratio).round() as usize);
    assert_eq!(result.num_frames(), report.frames_out);
}

#[test]
fn test_flac_output_keeps_frame_count() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("odd_length.wav");
    let output = dir.path().join("odd_length.flac");
    // Not a multiple of the FLAC block size
    write_wav(&input, 2, 44100, &sine_samples(10_007, 44100));

    let mut params = PerturbationParams::full();
    for stage in params.stages.iter_mut() {
        if let StageConfig::Pitch { min_samples, .. } = stage {
            *min_samples = usize::MAX;
        }
    }

    let report = process_file(&input, &output, &params, &mut RngSource::seeded(5)).unwrap();
    assert!(report
        .stages
        .iter()
        .any(|s| matches!(s, StageOutcome::PitchSkipped { .. })));

    let result = decode(&output).unwrap();
    assert_eq!(result.num_frames(), 10_007);
    assert_eq!(report.frames_out, 10_007);
}

#[test]
fn test_fixed_volume_is_exact_end_to_end() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("steps.wav");
    let output = dir.path().join("steps_out.wav");
    let samples: Vec<i16> = vec![1000, -2000, 3000, -4000, 0, 500];
    write_wav(&input, 1, 8000, &samples);

    let params = PerturbationParams {
        stages: vec![StageConfig::Volume {
            min_scale: 0.5,
            max_scale: 2.0,
        }],
        output: OutputSettings {
            format: OutputFormat::Wav,
            bitrate: None,
        },
    };

    process_file(&input, &output, &params, &mut FixedSource::new(1.5)).unwrap();

    let result = decode(&output).unwrap();
    assert_eq!(result.samples(), &[1500, -3000, 4500, -6000, 0, 750]);
}

#[test]
fn test_loud_input_saturates_without_wrapping() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("loud.wav");
    let output = dir.path().join("loud_out.wav");
    let samples: Vec<i16> = (0..4000)
        .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
        .collect();
    write_wav(&input, 1, 8000, &samples);

    let params = PerturbationParams {
        stages: vec![
            StageConfig::Noise { fraction: 0.01 },
            StageConfig::Volume {
                min_scale: 1.03,
                max_scale: 1.03,
            },
        ],
        output: OutputSettings {
            format: OutputFormat::Wav,
            bitrate: None,
        },
    };

    process_file(&input, &output, &params, &mut RngSource::seeded(3)).unwrap();

    let result = decode(&output).unwrap();
    // Positive peaks stay near the top, negative near the bottom
    for (i, &s) in result.samples().iter().enumerate() {
        assert!((i16::MIN as i32..=i16::MAX as i32).contains(&s));
        if i % 2 == 0 {
            assert!(s > 30000, "sample {} wrapped to {}", i, s);
        } else {
            assert!(s < -30000, "sample {} wrapped to {}", i, s);
        }
    }
}

#[test]
fn test_corrupt_input_is_decode_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("corrupt.wav");
    std::fs::write(&input, b"RIFF....WAVEjunk").unwrap();

    let err = process_file(
        &input,
        &dir.path().join("corrupt_out.wav"),
        &PerturbationParams::simplified(),
        &mut FixedSource::new(1.0),
    )
    .unwrap_err();
    assert_eq!(err.error_code(), "DECODE_ERROR");
}
