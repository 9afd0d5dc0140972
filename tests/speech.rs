//! Speech pipeline tests that need no audio hardware or network

mod common;

use std::io::Cursor;

use common::FakeSink;
use secrecy::SecretString;
use nova_face::speech::{HttpSynthesizer, Synthesizer, WhisperStt, samples_to_wav};

#[test]
fn wav_encoding_round_trips_through_hound() {
    let samples = vec![0.0, 0.25, -0.25, 0.5, -0.5];
    let wav = samples_to_wav(&samples, 16_000).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.bits_per_sample, 16);

    let decoded: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(decoded.len(), samples.len());
    assert_eq!(decoded[0], 0);
    assert!((f32::from(decoded[3]) / f32::from(i16::MAX) - 0.5).abs() < 1e-3);
}

#[test]
fn full_scale_samples_are_clamped() {
    let wav = samples_to_wav(&[2.0, -2.0], 8_000).unwrap();
    let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let decoded: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(decoded, vec![i16::MAX, -i16::MAX]);
}

#[test]
fn transcriber_sends_the_language_subtag() {
    let key = SecretString::from("test-key".to_string());
    assert_eq!(WhisperStt::new(key.clone(), "whisper-1", "es-MX").language(), "es");
    assert_eq!(WhisperStt::new(key.clone(), "whisper-1", "EN-us").language(), "en");
    assert_eq!(WhisperStt::new(key, "whisper-1", "ja").language(), "ja");
}

#[tokio::test]
async fn speak_cancels_the_previous_utterance_first() {
    let sink = FakeSink::new();
    let mut synth = HttpSynthesizer::new(
        SecretString::from("test-key".to_string()),
        "tts-1",
        "alloy",
        1.0,
        Box::new(sink.clone()),
    );

    // The cancel fires before any synthesis work, so the stop count
    // advances per call even when the fetch itself fails.
    let _ = synth.speak("primera").await;
    assert_eq!(sink.stops(), 1);
    let _ = synth.speak("segunda").await;
    assert_eq!(sink.stops(), 2);
    assert!(sink.started().is_empty());
}

#[test]
fn cancel_silences_the_sink() {
    let sink = FakeSink::new();
    let mut synth = HttpSynthesizer::new(
        SecretString::from("test-key".to_string()),
        "tts-1",
        "alloy",
        1.0,
        Box::new(sink.clone()),
    );

    synth.cancel();
    synth.cancel();
    assert_eq!(sink.stops(), 2);
}
