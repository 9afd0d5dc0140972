//! Clip catalog and exclusive playback tests

mod common;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use common::FakeSink;
use nova_face::Error;
use nova_face::audio::{AudioClip, AudioPlayer, ClipCatalog};

fn catalog() -> Arc<ClipCatalog> {
    let mut clips = HashMap::new();
    clips.insert(
        "amy_1".to_string(),
        AudioClip::from_samples(vec![0.1; 2000], 16_000),
    );
    clips.insert(
        "amy_2".to_string(),
        AudioClip::from_samples(vec![0.2; 3000], 16_000),
    );
    Arc::new(ClipCatalog::from_clips(clips))
}

#[test]
fn unknown_clip_is_rejected() {
    let sink = FakeSink::new();
    let mut player = AudioPlayer::new(catalog(), Box::new(sink.clone()));

    let err = player.play("amy_9").unwrap_err();
    assert!(matches!(err, Error::UnknownClip(name) if name == "amy_9"));
    assert!(sink.started().is_empty());
    assert!(!player.is_playing());
}

#[test]
fn starting_a_clip_supersedes_the_active_one() {
    let sink = FakeSink::new();
    let mut player = AudioPlayer::new(catalog(), Box::new(sink.clone()));

    player.play("amy_1").unwrap();
    sink.advance(500);
    assert_eq!(player.position("amy_1"), 500);

    player.play("amy_2").unwrap();
    assert_eq!(player.active_clip(), Some("amy_2"));
    // The superseded clip rewinds, so a replay starts from the top
    assert_eq!(player.position("amy_1"), 0);
    assert_eq!(sink.started(), vec![2000, 3000]);
    assert_eq!(sink.stops(), 1);
}

#[test]
fn replaying_the_same_clip_restarts_it() {
    let sink = FakeSink::new();
    let mut player = AudioPlayer::new(catalog(), Box::new(sink.clone()));

    player.play("amy_1").unwrap();
    sink.advance(1500);
    player.play("amy_1").unwrap();

    assert_eq!(player.position("amy_1"), 0);
    assert_eq!(sink.started(), vec![2000, 2000]);
}

#[test]
fn stop_when_idle_is_a_no_op() {
    let sink = FakeSink::new();
    let mut player = AudioPlayer::new(catalog(), Box::new(sink.clone()));

    player.stop();
    assert_eq!(sink.stops(), 0);
    assert!(!player.is_playing());
}

#[test]
fn catalog_loads_wav_files() {
    let dir = std::env::temp_dir().join("nova-face-audio-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("tone.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..100_i16 {
        writer.write_sample(i * 100).unwrap();
    }
    writer.finalize().unwrap();

    let catalog = ClipCatalog::load(&[("tone".to_string(), path)]).unwrap();
    let clip = catalog.get("tone").unwrap();
    assert_eq!(clip.len(), 100);
    assert_eq!(clip.sample_rate(), 16_000);
    assert!((clip.samples()[1] - 100.0 / 32_768.0).abs() < 1e-6);
}

#[test]
fn catalog_rejects_missing_files() {
    let entries = vec![(
        "ghost".to_string(),
        PathBuf::from("/nonexistent/ghost.wav"),
    )];
    assert!(ClipCatalog::load(&entries).is_err());
}
