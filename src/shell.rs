//! Interactive terminal shell
//!
//! Plain lines are translated; lines starting with `:` are commands.

use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;

use crate::catalog::{self, LANGUAGES, VOICES, VoiceName};
use crate::session::TranslatorSession;
use crate::voice::SpeechController;
use crate::{Error, Result};

/// One parsed line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Set the input text and translate it
    Translate(String),
    From(String),
    To(String),
    Swap,
    Voice(VoiceName),
    Speak,
    Stop,
    Languages,
    Voices,
    Help,
    Quit,
    /// Blank line
    Nothing,
}

impl ShellCommand {
    /// Parse one line of input
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for unknown commands, missing arguments, or an
    /// unknown voice
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();

        let Some(rest) = line.strip_prefix(':') else {
            return Ok(if line.is_empty() {
                Self::Nothing
            } else {
                Self::Translate(line.to_string())
            });
        };

        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));

        let require_arg = |what: &str| {
            if arg.is_empty() {
                Err(Error::Config(format!(":{name} needs a {what}")))
            } else {
                Ok(arg.to_string())
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "from" => require_arg("language code").map(Self::From),
            "to" => require_arg("language code").map(Self::To),
            "swap" => Ok(Self::Swap),
            "voice" => require_arg("voice name")?.parse().map(Self::Voice),
            "speak" | "say" => Ok(Self::Speak),
            "stop" => Ok(Self::Stop),
            "languages" | "langs" => Ok(Self::Languages),
            "voices" => Ok(Self::Voices),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(Error::Config(format!("unknown command :{other} (try :help)"))),
        }
    }
}

const HELP: &str = "\
Type text to translate it. Commands:
  :from CODE     set source language (e.g. :from en)
  :to CODE       set target language (e.g. :to es)
  :swap          swap languages and texts
  :voice NAME    select voice (Kore, Puck, Charon, Fenrir, Zephyr)
  :speak         speak the current translation
  :stop          stop playback
  :languages     list languages
  :voices        list voices
  :quit          leave";

/// Render the language list
#[must_use]
pub fn format_languages() -> String {
    LANGUAGES
        .iter()
        .map(|l| format!("  {} {:<4}{}", l.flag, l.code, l.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the voice list
#[must_use]
pub fn format_voices() -> String {
    VOICES
        .iter()
        .map(|v| format!("  {:<8}{}", v.label, v.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prompt_label(session: &TranslatorSession) -> String {
    let flag = |code: &str| catalog::find_language(code).map_or("", |l| l.flag);
    format!(
        "{} {} → {} {} [{}]",
        flag(session.source_lang()),
        session.source_lang(),
        flag(session.target_lang()),
        session.target_lang(),
        session.voice()
    )
}

/// Run a blocking terminal read off the async worker
///
/// Returns `None` at end of input.
fn read_line<F>(read: F) -> anyhow::Result<Option<String>>
where
    F: FnOnce() -> dialoguer::Result<String>,
{
    match tokio::task::block_in_place(read) {
        Ok(line) => Ok(Some(line)),
        // EOF or closed terminal ends the session
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Run the interactive loop until `:quit` or end of input
///
/// # Errors
///
/// Returns error if reading from the terminal fails
#[allow(clippy::future_not_send)]
pub async fn run(
    session: &mut TranslatorSession,
    controller: &mut SpeechController,
) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();
    println!("LinguoVoice - type :help for commands\n");

    loop {
        let prompt = prompt_label(session);
        let read = || {
            Input::<String>::with_theme(&theme)
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        };
        let Some(line) = read_line(read)? else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("  {e}");
                continue;
            }
        };

        match command {
            ShellCommand::Nothing => {}
            ShellCommand::Translate(text) => {
                session.set_input(text);
                session.translate().await;
                if session.error().is_none() {
                    println!("  {}", session.translated_text());
                }
            }
            ShellCommand::From(code) => {
                if let Err(e) = session.set_source_language(&code) {
                    println!("  {e}");
                }
            }
            ShellCommand::To(code) => {
                if let Err(e) = session.set_target_language(&code) {
                    println!("  {e}");
                }
            }
            ShellCommand::Swap => {
                session.swap_languages();
                if !session.input_text().is_empty() {
                    println!("  input: {}", session.input_text());
                }
            }
            ShellCommand::Voice(voice) => {
                session.select_voice(voice);
                println!("  voice: {} ({})", voice, voice.option().description);
            }
            ShellCommand::Speak => {
                if session.translated_text().trim().is_empty() {
                    println!("  nothing to speak yet");
                } else {
                    session.speak_translation(controller).await;
                }
            }
            ShellCommand::Stop => controller.stop(),
            ShellCommand::Languages => println!("{}", format_languages()),
            ShellCommand::Voices => println!("{}", format_voices()),
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
        }

        if let Some(message) = session.error() {
            println!("  ⚠ {message}");
            session.clear_error();
        }
    }

    controller.stop();
    Ok(())
}
