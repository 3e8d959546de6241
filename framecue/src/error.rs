use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown clip: {clip}")]
    UnknownClip { clip: String },

    #[error("unknown binding: {id}")]
    UnknownBinding { id: String },

    #[error("keyframe {id} is already in the sequence for clip '{clip}'")]
    DuplicateKeyframe { clip: String, id: u64 },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[cfg(feature = "json")]
    #[error("failed to parse sequence JSON: {message}")]
    JsonParse { message: String },

    #[cfg(feature = "json")]
    #[error("unsupported or invalid sequence format version: {value}")]
    JsonFormatVersion { value: String },

    #[cfg(feature = "json")]
    #[error("invalid sequence for clip '{clip}': {message}")]
    JsonInvalidSequence { clip: String, message: String },

    #[cfg(feature = "json")]
    #[error("clip '{clip}' is bound to more than one sequence")]
    JsonDuplicateClip { clip: String },
}
