use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use linguovoice::voice::{AudioBuffer, SPEECH_SAMPLE_RATE, pcm, samples_to_wav};
use linguovoice::{
    Config, CpalBackend, SpeechController, SpeechSynthesizer, Translator, TranslatorSession,
    VoiceName, catalog, shell,
};

/// LinguoVoice - translate text and hear it spoken
#[derive(Parser)]
#[command(name = "linguovoice", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive translation shell (default)
    Shell,
    /// Translate text once
    Translate {
        /// Text to translate
        text: String,
        /// Source language code
        #[arg(short, long)]
        from: Option<String>,
        /// Target language code
        #[arg(short, long)]
        to: Option<String>,
        /// Speak the translation after printing it
        #[arg(short, long)]
        speak: bool,
        /// Voice to speak with
        #[arg(long)]
        voice: Option<VoiceName>,
    },
    /// Speak text without translating
    Speak {
        /// Text to speak
        text: String,
        /// Voice to speak with
        #[arg(long)]
        voice: Option<VoiceName>,
        /// Write a WAV file instead of playing
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// List supported languages
    Languages,
    /// List available voices
    Voices,
    /// Test speaker output
    TestSpeaker,
    /// Interactive first-run setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,linguovoice=info",
        1 => "info,linguovoice=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
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
    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => run_shell().await,
        Command::Translate {
            text,
            from,
            to,
            speak,
            voice,
        } => translate_once(&text, from, to, speak, voice).await,
        Command::Speak { text, voice, save } => speak_once(&text, voice, save).await,
        Command::Languages => {
            println!("{}", shell::format_languages());
            Ok(())
        }
        Command::Voices => {
            println!("{}", shell::format_voices());
            Ok(())
        }
        Command::TestSpeaker => test_speaker().await,
        Command::Setup => linguovoice::setup::run_setup(),
    }
}

fn speech_controller(config: &Config) -> SpeechController {
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(config.speech_client());
    SpeechController::new(Box::new(CpalBackend), synthesizer)
}

/// Run the interactive shell
#[allow(clippy::future_not_send)]
async fn run_shell() -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let translator: Arc<dyn Translator> = Arc::new(config.translation_client());
    let mut session = TranslatorSession::new(translator, &config.defaults);
    let mut controller = speech_controller(&config);

    shell::run(&mut session, &mut controller).await
}

/// Translate a single text and optionally speak it
#[allow(clippy::future_not_send)]
async fn translate_once(
    text: &str,
    from: Option<String>,
    to: Option<String>,
    speak: bool,
    voice: Option<VoiceName>,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let from = from.unwrap_or_else(|| config.defaults.source_lang.clone());
    let to = to.unwrap_or_else(|| config.defaults.target_lang.clone());
    let source = catalog::require_language(&from)?.name;
    let target = catalog::require_language(&to)?.name;

    let translated = config.translation_client().translate(text, source, target).await?;
    println!("{translated}");

    if speak && !translated.trim().is_empty() {
        let voice = voice.unwrap_or(config.defaults.voice);
        let mut controller = speech_controller(&config);
        controller.speak(&translated, voice).await?;
        controller.wait_until_idle().await;
    }

    Ok(())
}

/// Speak a text, or save it as WAV
#[allow(clippy::future_not_send)]
async fn speak_once(text: &str, voice: Option<VoiceName>, save: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let voice = voice.unwrap_or(config.defaults.voice);

    if let Some(path) = save {
        let audio = config
            .speech_client()
            .synthesize(text, voice)
            .await?
            .ok_or_else(|| anyhow::anyhow!("speech service returned no audio"))?;

        let buffer = pcm::decode_speech_payload(&audio.data, SPEECH_SAMPLE_RATE)?;
        std::fs::write(&path, samples_to_wav(&buffer)?)?;

        println!(
            "Wrote {:.1}s of audio to {}",
            buffer.duration().as_secs_f32(),
            path.display()
        );
        return Ok(());
    }

    let mut controller = speech_controller(&config);
    controller.speak(text, voice).await?;
    controller.wait_until_idle().await;

    Ok(())
}

/// Test speaker output with a sine wave
#[allow(clippy::future_not_send)]
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    // Generate 2 seconds of 440Hz sine wave at the speech sample rate
    let frequency = 440.0_f32;
    let num_samples = SPEECH_SAMPLE_RATE as usize * 2;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / SPEECH_SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), SPEECH_SAMPLE_RATE);

    // No speech is synthesized here, so the controller never calls the client
    let config = Config::with_api_key("unused");
    let mut controller = speech_controller(&config);
    controller.play_buffer(AudioBuffer::mono(samples, SPEECH_SAMPLE_RATE))?;
    controller.wait_until_idle().await;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");
    println!("  3. Try: pavucontrol (to check output levels)");

    Ok(())
}
