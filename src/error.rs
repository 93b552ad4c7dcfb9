use thiserror::Error;

/// Why a document's front matter could not be extracted.
///
/// Extraction is all-or-nothing: no partially filled metadata accompanies
/// any of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("document does not start with a `---` metadata block")]
    MissingMetadataBlock,

    #[error("metadata block is not closed by a `---` line")]
    UnterminatedMetadataBlock,

    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ExtractError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(field: &'static str) -> Self {
        Self::invalid(field, "required field missing")
    }
}

impl From<serde_yaml::Error> for ExtractError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::MalformedMetadata(e.to_string())
    }
}
