//! Sequence interchange format version.

/// Major version of the JSON sequence format. Documents with a different major are rejected.
pub const SEQUENCE_FORMAT_MAJOR: u32 = 1;

/// Minor version of the JSON sequence format written by this crate.
pub const SEQUENCE_FORMAT_MINOR: u32 = 0;
