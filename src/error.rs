use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabscribeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Host error: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, TabscribeError>;
