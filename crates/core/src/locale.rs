//! Locale selection for user-facing messages.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Language used for messages returned to API callers.
///
/// Spanish is the default; it is the language the service's users read.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }

    /// Pick the string for this locale.
    pub fn pick<'a>(&self, es: &'a str, en: &'a str) -> &'a str {
        match self {
            Locale::Es => es,
            Locale::En => en,
        }
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "es-es" | "es_es" => Ok(Locale::Es),
            "en" | "en-us" | "en_us" | "en-gb" => Ok(Locale::En),
            other => Err(DomainError::validation(
                "locale",
                format!("unsupported locale '{other}' (expected es or en)"),
            )),
        }
    }
}

impl core::fmt::Display for Locale {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_variants() {
        assert_eq!("ES".parse::<Locale>().unwrap(), Locale::Es);
        assert_eq!("en-US".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn defaults_to_spanish() {
        assert_eq!(Locale::default(), Locale::Es);
        assert_eq!(Locale::default().pick("hola", "hello"), "hola");
    }
}
