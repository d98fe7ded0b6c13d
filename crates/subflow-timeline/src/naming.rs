//! Export formats and download filename derivation.

use serde::{Deserialize, Serialize};

/// Server-side rendering variants for an export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "translated")]
    Translated,
    #[serde(rename = "bilingual_orig_trans")]
    BilingualOriginalFirst,
    #[serde(rename = "bilingual_trans_orig")]
    BilingualTranslatedFirst,
}

impl ExportFormat {
    /// Identifier sent in the export form.
    pub fn as_form_value(self) -> &'static str {
        match self {
            ExportFormat::Original => "original",
            ExportFormat::Translated => "translated",
            ExportFormat::BilingualOriginalFirst => "bilingual_orig_trans",
            ExportFormat::BilingualTranslatedFirst => "bilingual_trans_orig",
        }
    }
}

/// Short code used in export filenames for the UI's language names.
///
/// Unknown languages fall back to a generic `trans` marker rather than
/// failing the export.
pub fn language_code(language: &str) -> &'static str {
    match language {
        "English" => "en",
        "Chinese" => "zh",
        "Japanese" => "jp",
        "French" => "fr",
        "German" => "de",
        "Cantonese" => "yue",
        "Italian" => "it",
        "Korean" => "ko",
        "Portuguese" => "pt",
        "Russian" => "ru",
        "Spanish" => "es",
        _ => "trans",
    }
}

/// Builds the local filename for an exported subtitle file.
///
/// `base` is the name the media was uploaded under; only its final
/// extension is stripped, dots earlier in the name survive.
pub fn download_filename(base: &str, format: ExportFormat, target_language: &str) -> String {
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    };
    let code = language_code(target_language);
    match format {
        ExportFormat::Original => format!("{stem}.srt"),
        ExportFormat::Translated => format!("{stem}_{code}.srt"),
        ExportFormat::BilingualOriginalFirst => format!("{stem}_{code}_orig_trans.srt"),
        ExportFormat::BilingualTranslatedFirst => format!("{stem}_{code}_trans_orig.srt"),
    }
}
