//! Locale Data
//!
//! Language-specific word lists (common words, suffixes, seasons, months,
//! weekdays) compiled into the binary. Lists that are too short for their
//! category are reported as unavailable so callers skip the matching token
//! instead of failing.

use serde::Deserialize;

use crate::error::LocaleError;

/// Language used when none is requested or the requested one is unknown.
pub const DEFAULT_LANGUAGE: &str = "en_us";

const EMBEDDED_LOCALES: &[(&str, &str)] = &[
    ("en_us", include_str!("../locales/en_us.json")),
    ("pt_br", include_str!("../locales/pt_br.json")),
];

const SEASON_COUNT: usize = 4;
const MONTH_COUNT: usize = 12;
const WEEKDAY_COUNT: usize = 7;

/// Normalize a language tag: lowercase, `-` to `_`, bare `en`/`pt` expanded.
pub fn normalize_language(lang: &str) -> String {
    let lang = lang.trim().to_lowercase().replace('-', "_");
    match lang.as_str() {
        "" | "en" => "en_us".to_string(),
        "pt" => "pt_br".to_string(),
        _ => lang,
    }
}

/// Word lists for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocaleData {
    pub common_words: Vec<String>,
    pub common_suffixes: Vec<String>,
    /// Spring, summer, fall, winter equivalents, in that order
    pub seasons: Vec<String>,
    pub months: Vec<String>,
    pub months_short: Vec<String>,
    pub weekdays: Vec<String>,
    pub weekdays_short: Vec<String>,
}

impl LocaleData {
    /// Load an embedded locale by language tag.
    pub fn load(lang: &str) -> Result<Self, LocaleError> {
        let language = normalize_language(lang);
        let (_, json) = EMBEDDED_LOCALES
            .iter()
            .find(|(name, _)| *name == language)
            .ok_or_else(|| LocaleError::UnknownLanguage(language.clone()))?;
        Self::from_json(&language, json)
    }

    /// Load a locale, falling back to [`DEFAULT_LANGUAGE`] (and then to empty
    /// lists) with a warning instead of failing.
    pub fn resolve(lang: &str) -> Self {
        match Self::load(lang) {
            Ok(locale) => locale,
            Err(e) => {
                tracing::warn!(error = %e, fallback = DEFAULT_LANGUAGE, "Locale unavailable, using fallback");
                Self::load(DEFAULT_LANGUAGE).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Default locale unavailable, continuing without locale data");
                    Self::default()
                })
            }
        }
    }

    pub fn from_json(language: &str, json: &str) -> Result<Self, LocaleError> {
        serde_json::from_str(json).map_err(|source| LocaleError::Parse {
            language: language.to_string(),
            source,
        })
    }

    /// Languages with embedded data.
    pub fn available() -> impl Iterator<Item = &'static str> {
        EMBEDDED_LOCALES.iter().map(|(name, _)| *name)
    }

    /// Seasons, when all four are present.
    pub fn seasons(&self) -> Option<&[String]> {
        complete(&self.seasons, SEASON_COUNT)
    }

    /// Month names, when all twelve are present.
    pub fn months(&self) -> Option<&[String]> {
        complete(&self.months, MONTH_COUNT)
    }

    /// Month abbreviations, when all twelve are present.
    pub fn months_short(&self) -> Option<&[String]> {
        complete(&self.months_short, MONTH_COUNT)
    }

    /// Weekday names, when all seven are present.
    pub fn weekdays(&self) -> Option<&[String]> {
        complete(&self.weekdays, WEEKDAY_COUNT)
    }
}

fn complete(list: &[String], required: usize) -> Option<&[String]> {
    (list.len() >= required).then_some(list)
}
