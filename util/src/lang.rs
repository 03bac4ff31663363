use std::str::FromStr;

/// Language used when rendering history and status labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    En,
    #[default]
    Ru,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            other => Err(format!("Unsupported language: {other}")),
        }
    }
}

impl Language {
    /// `HISTORY_LANGUAGE`, falling back to Russian on unknown values.
    pub fn from_config() -> Self {
        crate::config::history_language().parse().unwrap_or_default()
    }
}
