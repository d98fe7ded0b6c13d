//! Minimal console frontend.
//!
//! Stands in for a graphical client at the bridge boundary: stdin lines
//! become bridge commands, engine events become printed lines. Exported
//! files land in the current directory.

use std::io::{self, BufRead};
use std::sync::{Arc, Mutex};
use std::thread;

use subflow_bridge::{MessageFromBackend, MessageToBackend, TranslateRequest};
use subflow_bridge::config::Config;
use subflow_bridge::notification::NotificationType;
use subflow_timeline::format;
use subflow_timeline::overlay::DisplayMode;
use tokio::sync::mpsc;

use crate::commands::Input;

pub mod commands;

/// State the console needs to finalize commands: the last configuration the
/// engine reported. Shared between the stdin thread and the event loop.
#[derive(Debug, Default)]
struct ConsoleShared {
    config: Option<Config>,
}

type SharedHandle = Arc<Mutex<ConsoleShared>>;

/// Runs the console until the engine side closes the bridge. Blocks the
/// calling thread.
pub fn run(
    mut rx: mpsc::Receiver<MessageFromBackend>,
    tx: mpsc::Sender<MessageToBackend>,
) -> anyhow::Result<()> {
    let shared: SharedHandle = Arc::new(Mutex::new(ConsoleShared::default()));
    print_help();
    tx.blocking_send(MessageToBackend::ConfigurationRequest)?;

    let input_shared = shared.clone();
    let input_tx = tx.clone();
    thread::spawn(move || read_commands(input_tx, input_shared));

    while let Some(message) = rx.blocking_recv() {
        render(&shared, message);
    }
    Ok(())
}

fn read_commands(tx: mpsc::Sender<MessageToBackend>, shared: SharedHandle) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let input = match commands::parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(usage) => {
                eprintln!("{usage}");
                continue;
            }
        };
        let Some(message) = finalize(input, &shared) else {
            continue;
        };
        if tx.blocking_send(message).is_err() {
            break;
        }
    }
}

/// Turns a parsed input into a bridge command, filling defaults from the
/// cached configuration. `None` means the input was handled locally.
fn finalize(input: Input, shared: &SharedHandle) -> Option<MessageToBackend> {
    match input {
        Input::Help => {
            print_help();
            None
        }
        Input::Quit => {
            println!("bye");
            std::process::exit(0);
        }
        Input::ShowConfig => Some(MessageToBackend::ConfigurationRequest),
        Input::SetTargetLanguage(language) => {
            let mut guard = shared.lock().expect("console state lock poisoned");
            match guard.config.as_mut() {
                Some(config) => {
                    config.default_target_language = language;
                    Some(MessageToBackend::UpdateConfiguration(config.clone()))
                }
                None => {
                    eprintln!("configuration not loaded yet, try again in a moment");
                    None
                }
            }
        }
        Input::RememberKey(key) => Some(MessageToBackend::RememberApiKey(key)),
        Input::Open(path) => Some(MessageToBackend::UploadMedia { path }),
        Input::Import(path) => Some(MessageToBackend::ImportSubtitleFile { path }),
        Input::Transcribe {
            language,
            max_line_width,
        } => {
            let config = current_config(shared);
            Some(MessageToBackend::StartTranscription {
                language: language.unwrap_or(config.default_source_language),
                max_line_width: max_line_width.unwrap_or(config.default_max_line_width),
            })
        }
        Input::Translate {
            provider,
            api_key,
            system_prompt,
        } => {
            let config = current_config(shared);
            Some(MessageToBackend::StartTranslation(TranslateRequest {
                target_language: config.default_target_language,
                provider: provider.unwrap_or(config.default_provider),
                api_key,
                system_prompt,
            }))
        }
        Input::SetMode(mode) => Some(MessageToBackend::SetDisplayMode(mode)),
        Input::At(seconds) => Some(MessageToBackend::PlaybackPosition(seconds)),
        Input::Export(format) => {
            let config = current_config(shared);
            Some(MessageToBackend::ExportSubtitles {
                format,
                target_language: config.default_target_language,
            })
        }
        Input::NewProject => Some(MessageToBackend::NewProject),
    }
}

fn current_config(shared: &SharedHandle) -> Config {
    shared
        .lock()
        .expect("console state lock poisoned")
        .config
        .clone()
        .unwrap_or_default()
}

fn render(shared: &SharedHandle, message: MessageFromBackend) {
    match message {
        MessageFromBackend::NotificationMessage(note) => {
            let tag = match note.notification_type {
                NotificationType::Info => "info",
                NotificationType::Success => "ok",
                NotificationType::Warning => "warn",
                NotificationType::Error => "error",
            };
            println!("[{tag}] {}", note.message);
        }
        MessageFromBackend::ConfigurationResponse(config) => {
            println!("settings:");
            println!("  service url      {}", config.service_url);
            println!("  source language  {}", config.default_source_language);
            println!("  target language  {}", config.default_target_language);
            println!("  max line width   {}", config.default_max_line_width);
            println!("  provider         {}", config.default_provider.as_form_value());
            println!("  display mode     {}", mode_label(config.default_display_mode));
            shared.lock().expect("console state lock poisoned").config = Some(config);
        }
        MessageFromBackend::MediaSourceChanged { url, filename } => {
            println!("media ready: {filename}");
            println!("  streaming from {url}");
        }
        MessageFromBackend::WorkflowStepChanged(step) => {
            println!("step: {}", step.label());
        }
        MessageFromBackend::CredentialLoaded(_) => {
            println!("restored a saved API key");
        }
        MessageFromBackend::TranscriptionStarted { task_id } => {
            println!("task {task_id} accepted");
        }
        MessageFromBackend::TranscriptionProgress { percent, message } => {
            println!("[{percent:>3}%] {message}");
        }
        MessageFromBackend::RuntimeTimerTick { elapsed_secs } => {
            println!("elapsed {}", format::elapsed(elapsed_secs));
        }
        MessageFromBackend::TrackUpdated { track, entries } => {
            println!("{track:?} track, {} line(s):", entries.len());
            for entry in &entries {
                println!(
                    "  {} --> {}  {}",
                    format::timestamp(entry.start),
                    format::timestamp(entry.end),
                    entry.text.replace('\n', " ")
                );
            }
        }
        MessageFromBackend::TranscriptionCompleted {
            elapsed_secs,
            download_url,
        } => {
            match elapsed_secs {
                Some(secs) => println!(
                    "transcription completed in {}",
                    format::duration_phrase(secs)
                ),
                None => println!("transcription completed"),
            }
            if let Some(url) = download_url {
                println!("  server copy: {url}");
            }
        }
        MessageFromBackend::TranscriptionFailed { error } => {
            println!("transcription failed: {error}");
        }
        MessageFromBackend::DisplayModeChanged(mode) => {
            println!("display mode: {}", mode_label(mode));
        }
        MessageFromBackend::OverlayUpdate { text } => match text {
            Some(text) => println!("overlay | {}", text.replace('\n', " | ")),
            None => println!("overlay hidden"),
        },
        MessageFromBackend::ExportFinished { filename, data } => {
            match std::fs::write(&filename, &data) {
                Ok(()) => println!("saved {filename} ({} bytes)", data.len()),
                Err(err) => eprintln!("could not save {filename}: {err}"),
            }
        }
        MessageFromBackend::SessionCleared => {
            println!("session cleared, starting fresh");
        }
    }
}

fn mode_label(mode: DisplayMode) -> &'static str {
    match mode {
        DisplayMode::Original => "original",
        DisplayMode::Translated => "translated",
        DisplayMode::BilingualOriginalFirst => "bilingual_orig_trans",
        DisplayMode::BilingualTranslatedFirst => "bilingual_trans_orig",
    }
}

fn print_help() {
    println!("commands:");
    println!("  open <media file>                    upload a video or audio file");
    println!("  import <subtitle file>               import an existing .srt instead");
    println!("  transcribe [lang] [width]            start transcription of the upload");
    println!("  translate [provider] [key] [prompt]  translate the original track (deepseek|local)");
    println!("  lang <language>                      set the target language, e.g. lang Chinese");
    println!("  key <api key>                        remember a DeepSeek API key");
    println!("  mode <display mode>                  original|translated|bilingual_orig_trans|bilingual_trans_orig");
    println!("  at <seconds>                         report a playback position");
    println!("  export <format>                      download subtitles (formats match the modes)");
    println!("  config                               show the current settings");
    println!("  new                                  discard the session and start over");
    println!("  help                                 show this list");
    println!("  quit                                 leave");
}
