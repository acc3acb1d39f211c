use thiserror::Error;

use crate::core::models::envelope::ResponseEnvelope;

/// Pipeline failures, each mapped to the error label reported in the 500
/// envelope. The snapshot upload deliberately has no variant here: a failed
/// upload is logged and swallowed, never surfaced to the caller.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cost query failed: {0}")]
    CostQuery(#[source] anyhow::Error),

    #[error("template fetch failed: {0}")]
    TemplateFetch(#[source] anyhow::Error),

    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CostQuery(_) => "Cost Explorer Error",
            Self::TemplateFetch(_) => "Template Fetch Error",
            Self::Config(_) | Self::Other(_) => "Internal Server Error",
        }
    }

    /// Full cause chain as text, one frame per line.
    pub fn trace(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\ncaused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }

    /// Convert into the 500 envelope this failure is reported as.
    pub fn into_envelope(self) -> ResponseEnvelope {
        ResponseEnvelope::failure(self.label(), &self.to_string(), &self.trace())
    }
}
