//! Error types for configuration, flow loading and image redaction.

/// Errors raised while reading process configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required environment variable is absent or empty
    Missing(&'static str),
    /// A variable is present but could not be parsed
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Missing configuration: {key} must be set"),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid configuration: {key}={value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised while loading or checking a flow definition
#[derive(Debug)]
pub enum FlowError {
    /// The flow file could not be read
    Io(std::io::Error),
    /// The flow file is not valid JSON for a flow definition
    Parse(serde_json::Error),
    /// The flow has no fields
    Empty,
    /// Two fields share the same name
    DuplicateField(String),
    /// An image field carries a text validator
    ImageValidator(String),
    /// No built-in flow with this name exists
    UnknownFlow(String),
    /// A label, prompt or template id does not resolve against the locales
    UnresolvedMessage { id: String, reason: String },
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowError::Io(e) => write!(f, "Flow file error: {e}"),
            FlowError::Parse(e) => write!(f, "Flow parse error: {e}"),
            FlowError::Empty => write!(f, "Flow definition has no fields"),
            FlowError::DuplicateField(name) => write!(f, "Duplicate field name: {name}"),
            FlowError::ImageValidator(name) => {
                write!(f, "Image field {name} cannot have a text validator")
            }
            FlowError::UnknownFlow(name) => write!(f, "Unknown flow: {name}"),
            FlowError::UnresolvedMessage { id, reason } => {
                write!(f, "Message {id} cannot be used: {reason}")
            }
        }
    }
}

impl std::error::Error for FlowError {}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::Io(err)
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Parse(err)
    }
}

/// Errors raised by the redaction pipeline
#[derive(Debug)]
pub enum RedactionError {
    /// The input bytes are not a decodable image
    Decode(String),
    /// The blurred image could not be encoded
    Encode(String),
}

impl std::fmt::Display for RedactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedactionError::Decode(msg) => write!(f, "Image decode error: {msg}"),
            RedactionError::Encode(msg) => write!(f, "Image encode error: {msg}"),
        }
    }
}

impl std::error::Error for RedactionError {}
