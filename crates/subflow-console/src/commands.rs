//! Parsing of console input lines into semantic commands.
//!
//! Parsing is pure; defaults that depend on the loaded configuration are
//! filled in later by the event loop.

use std::path::PathBuf;

use subflow_bridge::config::Provider;
use subflow_timeline::naming::ExportFormat;
use subflow_timeline::overlay::DisplayMode;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Help,
    Quit,
    ShowConfig,
    SetTargetLanguage(String),
    RememberKey(String),
    Open(PathBuf),
    Import(PathBuf),
    Transcribe {
        language: Option<String>,
        max_line_width: Option<u32>,
    },
    Translate {
        provider: Option<Provider>,
        api_key: Option<String>,
        system_prompt: Option<String>,
    },
    SetMode(DisplayMode),
    At(f64),
    Export(ExportFormat),
    NewProject,
}

/// Parses a line. `Ok(None)` means the line was blank; `Err` carries a
/// usage message for the user.
pub fn parse(line: &str) -> Result<Option<Input>, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = parts.collect();

    let input = match command {
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "config" => Input::ShowConfig,
        "new" => Input::NewProject,
        "open" => Input::Open(path_arg(&rest, "open <media file>")?),
        "import" => Input::Import(path_arg(&rest, "import <subtitle file>")?),
        "lang" => {
            if rest.is_empty() {
                return Err(String::from("usage: lang <language>, e.g. lang Chinese"));
            }
            Input::SetTargetLanguage(rest.join(" "))
        }
        "key" => match rest.as_slice() {
            [key] => Input::RememberKey((*key).to_string()),
            _ => return Err(String::from("usage: key <api key>")),
        },
        "transcribe" => {
            let language = rest.first().map(|raw| (*raw).to_string());
            let max_line_width = match rest.get(1) {
                Some(raw) => Some(
                    raw.parse()
                        .map_err(|_| format!("line width must be a number, got {raw:?}"))?,
                ),
                None => None,
            };
            Input::Transcribe {
                language,
                max_line_width,
            }
        }
        "translate" => {
            let provider = match rest.first() {
                Some(raw) => Some(parse_provider(raw)?),
                None => None,
            };
            let api_key = rest.get(1).map(|raw| (*raw).to_string());
            // Everything past the key is the prompt, spaces included.
            let system_prompt = if rest.len() > 2 {
                Some(rest[2..].join(" "))
            } else {
                None
            };
            Input::Translate {
                provider,
                api_key,
                system_prompt,
            }
        }
        "mode" => match rest.as_slice() {
            [token] => Input::SetMode(parse_mode(token)?),
            _ => return Err(format!("usage: mode <{}>", MODE_TOKENS.join("|"))),
        },
        "at" => match rest.as_slice() {
            [raw] => {
                let seconds = raw
                    .parse()
                    .map_err(|_| format!("position must be seconds, got {raw:?}"))?;
                Input::At(seconds)
            }
            _ => return Err(String::from("usage: at <seconds>")),
        },
        "export" => match rest.as_slice() {
            [token] => Input::Export(parse_format(token)?),
            _ => return Err(format!("usage: export <{}>", MODE_TOKENS.join("|"))),
        },
        other => return Err(format!("unknown command {other:?}, try \"help\"")),
    };
    Ok(Some(input))
}

const MODE_TOKENS: [&str; 4] = [
    "original",
    "translated",
    "bilingual_orig_trans",
    "bilingual_trans_orig",
];

fn path_arg(rest: &[&str], usage: &str) -> Result<PathBuf, String> {
    if rest.is_empty() {
        return Err(format!("usage: {usage}"));
    }
    // Paths may contain spaces; everything after the command is the path.
    Ok(PathBuf::from(rest.join(" ")))
}

fn parse_provider(token: &str) -> Result<Provider, String> {
    match token {
        "deepseek" => Ok(Provider::Deepseek),
        "local" => Ok(Provider::Local),
        other => Err(format!("unknown provider {other:?}, use deepseek or local")),
    }
}

fn parse_mode(token: &str) -> Result<DisplayMode, String> {
    match token {
        "original" => Ok(DisplayMode::Original),
        "translated" => Ok(DisplayMode::Translated),
        "bilingual_orig_trans" => Ok(DisplayMode::BilingualOriginalFirst),
        "bilingual_trans_orig" => Ok(DisplayMode::BilingualTranslatedFirst),
        other => Err(format!("unknown display mode {other:?}")),
    }
}

fn parse_format(token: &str) -> Result<ExportFormat, String> {
    match token {
        "original" => Ok(ExportFormat::Original),
        "translated" => Ok(ExportFormat::Translated),
        "bilingual_orig_trans" => Ok(ExportFormat::BilingualOriginalFirst),
        "bilingual_trans_orig" => Ok(ExportFormat::BilingualTranslatedFirst),
        other => Err(format!("unknown export format {other:?}")),
    }
}
