use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

/// UI language a mask (or the whole store) prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Cn,
    #[default]
    En,
    Tw,
    Jp,
    Ko,
    Fr,
    De,
    Es,
    It,
    Ru,
}

pub const ALL_LANGS: [Lang; 10] = [
    Lang::Cn,
    Lang::En,
    Lang::Tw,
    Lang::Jp,
    Lang::Ko,
    Lang::Fr,
    Lang::De,
    Lang::Es,
    Lang::It,
    Lang::Ru,
];

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::Cn => "cn",
            Lang::En => "en",
            Lang::Tw => "tw",
            Lang::Jp => "jp",
            Lang::Ko => "ko",
            Lang::Fr => "fr",
            Lang::De => "de",
            Lang::Es => "es",
            Lang::It => "it",
            Lang::Ru => "ru",
        }
    }

    /// Pick a language from the process locale (`LC_ALL`, `LC_MESSAGES`, `LANG`).
    pub fn detect() -> Lang {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.is_empty())
            .and_then(|locale| Self::from_locale(&locale))
            .unwrap_or_default()
    }

    /// Map a POSIX/BCP-47 locale string such as `zh_TW.UTF-8` or `ja-JP` to a language.
    pub fn from_locale(locale: &str) -> Option<Lang> {
        let normalized = locale
            .split('.')
            .next()
            .unwrap_or_default()
            .replace('-', "_")
            .to_lowercase();
        let mut parts = normalized.split('_');
        let language = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();

        match language {
            "zh" if matches!(region, "tw" | "hk" | "mo" | "hant") => Some(Lang::Tw),
            "zh" | "cn" => Some(Lang::Cn),
            "ja" | "jp" => Some(Lang::Jp),
            "ko" => Some(Lang::Ko),
            "en" => Some(Lang::En),
            "fr" => Some(Lang::Fr),
            "de" => Some(Lang::De),
            "es" => Some(Lang::Es),
            "it" => Some(Lang::It),
            "ru" => Some(Lang::Ru),
            _ => None,
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangParseError {
    input: String,
}

impl fmt::Display for LangParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = ALL_LANGS.iter().map(|lang| lang.code()).collect();
        write!(
            f,
            "Unknown language '{}'. Expected one of: {}",
            self.input,
            codes.join(", ")
        )
    }
}

impl StdError for LangParseError {}

impl FromStr for Lang {
    type Err = LangParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ALL_LANGS
            .iter()
            .copied()
            .find(|lang| lang.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LangParseError {
                input: s.to_string(),
            })
    }
}
