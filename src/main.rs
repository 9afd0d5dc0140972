use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use nova_face::animation::{FrameAnimator, FrameSequence};
use nova_face::audio::{AudioClip, AudioPlayer, ClipCatalog, ClipSink, CpalSink};
use nova_face::speech::{HttpSynthesizer, MicRecognizer, Microphone, Synthesizer, WhisperStt};
use nova_face::surface::TermSurface;
use nova_face::{CommandInterpreter, Config, Controller, FaceEvent};

/// Nova - an interactive talking face
#[derive(Parser)]
#[command(name = "nova", version, about)]
struct Cli {
    /// Path to a config file (defaults to the platform config dir)
    #[arg(short, long, env = "NOVA_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable speech features (for machines without audio hardware)
    #[arg(long, env = "NOVA_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Play a named clip from the catalog
    Play {
        /// Clip name, e.g. "amy_1"
        clip: String,
    },
    /// Synthesize and speak a line of text
    Say {
        /// Text to speak
        #[arg(default_value = "Hola, soy Amy.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,nova_face=info",
        1 => "info,nova_face=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref(), cli.disable_voice)?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::Play { clip } => cmd_play(&config, &clip).await,
            Command::Say { text } => cmd_say(&config, &text).await,
        };
    }

    run_widget(config).await
}

#[allow(clippy::future_not_send)]
async fn run_widget(config: Config) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();

    let frames = FrameSequence::new(config.frames.clone())?;
    let animator = FrameAnimator::new(frames, Box::new(TermSurface));

    let catalog = Arc::new(ClipCatalog::load(&config.clips)?);
    let player = AudioPlayer::new(catalog, Box::new(CpalSink::new(tx.clone())));

    // Speech is optional: without a key (or with voice disabled) the face
    // still animates and taps are logged.
    let (recognizer, synthesizer) = if config.voice_enabled {
        match config.api_key.clone() {
            Some(key) => {
                let stt = WhisperStt::new(key.clone(), &config.stt_model, &config.locale);
                let recognizer: Box<dyn nova_face::speech::Recognizer> =
                    Box::new(MicRecognizer::new(stt, tx.clone()));
                let synth: Box<dyn Synthesizer> = Box::new(HttpSynthesizer::new(
                    key,
                    &config.tts_model,
                    &config.tts_voice,
                    config.tts_speed,
                    Box::new(CpalSink::new(tx.clone())),
                ));
                (Some(recognizer), Some(synth))
            }
            None => (None, None),
        }
    } else {
        tracing::warn!("speech features disabled, running face and clips only");
        (None, None)
    };

    let interpreter = CommandInterpreter::new(&config.fallback_text);
    let mut controller = Controller::new(
        animator,
        player,
        recognizer,
        synthesizer,
        Box::new(TermSurface),
        interpreter,
        Duration::from_millis(config.frame_interval_ms),
    );

    // Stdin stands in for tapping the face: each line is one tap.
    let taps = tx.clone();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if taps.send(FaceEvent::Tapped).is_err() {
                        break;
                    }
                }
            }
        }
    });

    tracing::info!("nova ready - press Enter to talk to the face");

    tokio::select! {
        result = controller.run(rx) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }

    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut mic = Microphone::new();
    mic.start()?;
    println!("Sample rate: {} Hz", nova_face::speech::SAMPLE_RATE);
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = mic.take();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    mic.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
#[allow(clippy::future_not_send)]
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let sample_rate = 24_000_u32;
    let frequency = 440.0_f32;
    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();
    let clip = AudioClip::from_samples(samples, sample_rate);

    println!("Playing {} samples at {sample_rate} Hz...", clip.len());
    play_and_wait(&clip).await?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");

    Ok(())
}

/// Play a catalog clip and wait for it to finish
#[allow(clippy::future_not_send)]
async fn cmd_play(config: &Config, name: &str) -> anyhow::Result<()> {
    let catalog = ClipCatalog::load(&config.clips)?;
    let clip = catalog
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("unknown clip: {name}"))?
        .clone();

    println!("Playing {name} ({} samples)...", clip.len());
    play_and_wait(&clip).await?;
    Ok(())
}

/// Synthesize text and wait for playback to finish
#[allow(clippy::future_not_send)]
async fn cmd_say(config: &Config, text: &str) -> anyhow::Result<()> {
    let Some(key) = config.api_key.clone() else {
        anyhow::bail!("OPENAI_API_KEY is not set; cannot synthesize speech");
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut synth = HttpSynthesizer::new(
        key,
        &config.tts_model,
        &config.tts_voice,
        config.tts_speed,
        Box::new(CpalSink::new(tx)),
    );

    println!("Synthesizing: \"{text}\"");
    synth.speak(text).await?;
    wait_for_finish(&mut rx).await;
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn play_and_wait(clip: &AudioClip) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sink = CpalSink::new(tx);
    sink.start(clip, Arc::new(std::sync::atomic::AtomicUsize::new(0)))?;
    wait_for_finish(&mut rx).await;
    sink.stop();
    Ok(())
}

async fn wait_for_finish(rx: &mut mpsc::UnboundedReceiver<FaceEvent>) {
    while let Some(event) = rx.recv().await {
        if event == FaceEvent::PlaybackFinished {
            break;
        }
    }
}
