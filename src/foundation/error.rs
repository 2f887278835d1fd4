pub type CarouselResult<T> = Result<T, CarouselError>;

#[derive(thiserror::Error, Debug)]
pub enum CarouselError {
    #[error("layout error: {0}")]
    Layout(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("provider unavailable: no credential configured for {provider}")]
    ProviderUnavailable { provider: &'static str },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("polling exhausted: {0}")]
    PollingExhausted(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CarouselError {
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unavailable(provider: &'static str) -> Self {
        Self::ProviderUnavailable { provider }
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    pub fn polling_exhausted(msg: impl Into<String>) -> Self {
        Self::PollingExhausted(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<reqwest::Error> for CarouselError {
    fn from(err: reqwest::Error) -> Self {
        Self::Provider(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
