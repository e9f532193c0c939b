use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpAstError {
    #[error("解析错误: {0}")]
    ParseError(#[from] crate::parser::ParseError),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("配置文件解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// Result type for httpast crate
pub type Result<T> = std::result::Result<T, HttpAstError>;
