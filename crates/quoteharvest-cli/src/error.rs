use quoteharvest_core::PipelineError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] quoteharvest_core::ValidationError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Pipeline(PipelineError::Validation(_) | PipelineError::InvalidConfig { .. }) => 2,
            Self::Pipeline(PipelineError::NoData { .. } | PipelineError::NoSymbols) => 3,
            Self::Pipeline(
                PipelineError::MissingInput { .. }
                | PipelineError::EmptyInput { .. }
                | PipelineError::MissingColumn { .. }
                | PipelineError::Csv(_),
            ) => 4,
            Self::Serialization(_) => 4,
            Self::Logging(_) => 5,
            Self::Pipeline(_) | Self::Io(_) => 10,
        }
    }
}
