use marshal_api::MarshalError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("{0}")]
    Marshal(#[from] MarshalError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("hex input: {0}")]
    Hex(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Input(String),
}
