//! Error types for resource decoding.

use otrkit_common::{ResourceFormat, ResourceType};
use thiserror::Error;

/// Errors raised while turning a file into a resource.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Malformed binary data (short read, NaN after byte swap, bad marker).
    #[error("{0}")]
    Common(#[from] otrkit_common::Error),

    /// No decoder is registered for the resource type.
    #[error("unsupported resource type {resource_type} ({format:?})")]
    UnsupportedType {
        resource_type: ResourceType,
        format: ResourceFormat,
    },

    /// The type is known but the schema version is not.
    #[error("unsupported version {version} for {resource_type} ({format:?})")]
    UnsupportedVersion {
        resource_type: ResourceType,
        format: ResourceFormat,
        version: u32,
    },

    /// XML syntax error.
    #[error("XML error: {0}")]
    Xml(String),

    /// The XML root element does not name a resource type.
    #[error("unknown XML resource root <{0}>")]
    UnknownRoot(String),

    /// An XML element the decoder does not understand.
    #[error("unknown element <{0}>")]
    UnknownElement(String),

    /// A required XML attribute is missing.
    #[error("<{element}> is missing attribute {attribute}")]
    MissingAttribute { element: String, attribute: String },

    /// An XML attribute could not be parsed.
    #[error("<{element}> attribute {attribute} has invalid value {value:?}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    /// A field holds a value outside its enumeration.
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: u32 },

    /// A scene command id that has no decoder.
    #[error("unknown scene command {0:#04x}")]
    UnknownSceneCommand(u32),

    /// A decoder received the wrong payload kind.
    #[error("expected a {expected:?} payload")]
    WrongPayload { expected: ResourceFormat },

    /// JSON document error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text payload is not UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The resource cannot be written back to the binary format.
    #[error("cannot encode {0}")]
    Unencodable(String),
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
