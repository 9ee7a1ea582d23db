use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Project config validation error (duplicate level, bad layer reference, etc.).
    ConfigValidation(String),
    /// A layer or edit references an admin level that is not declared.
    UnknownLevel(String),
    /// Malformed GeoJSON text. `source` names where the text came from.
    GeoJsonParse { source: String, message: String },
    /// Malformed persisted mapping.
    MappingParse(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownLevel(level) => write!(f, "unknown admin level: {level}"),
            Self::GeoJsonParse { source, message } => {
                write!(f, "'{source}': cannot parse GeoJSON: {message}")
            }
            Self::MappingParse(msg) => write!(f, "mapping parse error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
