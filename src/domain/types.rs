//! Identifiers every cache entry and fetch is scoped by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Longest accepted locale tag (`pt-br`, `zh-hant`, ...).
const MAX_LOCALE_LEN: usize = 16;

/// One section of the site whose configuration lives in the content backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Navbar,
    Hero,
    Welcome,
    Treatments,
    ContactMap,
    Footer,
}

impl ContentKind {
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Navbar,
        ContentKind::Hero,
        ContentKind::Welcome,
        ContentKind::Treatments,
        ContentKind::ContactMap,
        ContentKind::Footer,
    ];

    /// Identifier used in configuration, logs and revalidation tags.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Navbar => "navbar",
            ContentKind::Hero => "hero",
            ContentKind::Welcome => "welcome",
            ContentKind::Treatments => "treatments",
            ContentKind::ContactMap => "contactMap",
            ContentKind::Footer => "footer",
        }
    }

    /// Path segment under `<base>/api/` on the content backend.
    pub fn endpoint(self) -> &'static str {
        match self {
            ContentKind::Navbar => "navbar",
            ContentKind::Hero => "hero",
            ContentKind::Welcome => "welcome",
            ContentKind::Treatments => "treatments",
            ContentKind::ContactMap => "contact-map",
            ContentKind::Footer => "footer",
        }
    }

    /// Tag under which the response cache stores this kind for `locale`.
    pub fn tag(self, locale: &Locale) -> String {
        format!("{}-{}", self.as_str(), locale.as_str())
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        ContentKind::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str().eq_ignore_ascii_case(trimmed) || kind.endpoint() == trimmed
            })
            .ok_or_else(|| DomainError::unknown_kind(value))
    }
}

/// A short language code, trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyLocale);
        }

        let valid = trimmed.len() <= MAX_LOCALE_LEN
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DomainError::invalid_locale(trimmed));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma-separated list, skipping blanks and duplicates.
    pub fn parse_list(value: &str) -> Result<Vec<Locale>, DomainError> {
        let mut locales: Vec<Locale> = Vec::new();
        for part in value.split(',').filter(|part| !part.trim().is_empty()) {
            let locale = Locale::parse(part)?;
            if !locales.contains(&locale) {
                locales.push(locale);
            }
        }
        Ok(locales)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Locale::parse(value)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Locale::parse(&raw).map_err(serde::de::Error::custom)
    }
}
