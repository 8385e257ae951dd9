use thiserror::Error;

pub mod core_config;


#[derive(Debug, Error)]
pub enum ConfigParsingError {
    #[error("Parsing error: `{0}`")]
    GeneralParsingError(String),
    #[error("Unsupported config file `{0}`")]
    UnsupportedFile(String),
}

#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Signature algorithm `{0}` is not enabled")]
    AlgorithmNotEnabled(String),
    #[error("Key size {key_size} is not supported for `{algorithm}`")]
    UnsupportedKeySize { algorithm: String, key_size: u32 },
    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
