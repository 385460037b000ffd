use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Agent not found: {0:?}")]
    AgentNotFound(crate::core::types::AgentId),

    #[error("Squad not found: {0:?}")]
    SquadNotFound(crate::core::types::SquadId),

    #[error("Invalid brain shape: expected {expected_inputs} inputs / {expected_outputs} outputs, got {actual_inputs} / {actual_outputs}")]
    BrainShapeMismatch {
        expected_inputs: usize,
        expected_outputs: usize,
        actual_inputs: usize,
        actual_outputs: usize,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Preset parse error: {0}")]
    PresetError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AiError>;
