use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] tvm_config::ConfigError),

    #[error("Auth error: {0}")]
    Auth(#[from] tvm_auth::AuthError),

    #[error("Failed to read JWT key file {path}: {source}")]
    JwtKeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("Startup failed: {message}")]
    Startup { message: String },
}

pub type Result<T> = std::result::Result<T, ServerError>;
