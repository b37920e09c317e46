use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("locale must not be empty")]
    EmptyLocale,
    #[error("locale `{value}` is not a valid language code")]
    InvalidLocale { value: String },
    #[error("unknown content kind `{value}`")]
    UnknownKind { value: String },
}

impl DomainError {
    pub fn invalid_locale(value: impl Into<String>) -> Self {
        Self::InvalidLocale {
            value: value.into(),
        }
    }

    pub fn unknown_kind(value: impl Into<String>) -> Self {
        Self::UnknownKind {
            value: value.into(),
        }
    }
}
