use thiserror::Error;

use crate::types::ResolutionResult;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("no provider credential configured")]
    NoCredential,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Provider { status: String, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("mapping service unavailable ({attempts} readiness attempts)")]
    ServiceUnavailable { attempts: u32 },

    #[error("no results for the given address")]
    NoResults,

    /// Soft failure: the coordinate is present and usable, but below the
    /// precision bar. Callers decide whether to keep it (typically shown
    /// with a reduced-confidence warning rather than discarded).
    #[error("low-precision result: {reason}")]
    LowPrecision {
        result: ResolutionResult,
        reason: PrecisionIssue,
    },
}

/// Why a [`ResolutionResult`] failed accuracy validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PrecisionIssue {
    #[error("{axis} carries only {digits} fractional digits")]
    CoarseCoordinate { axis: &'static str, digits: u32 },

    #[error("accuracy tier is below the accepted range")]
    CoarseTier,
}
