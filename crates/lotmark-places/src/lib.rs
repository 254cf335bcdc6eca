//! Typed client for a mapping provider's Autocomplete, Geocoding, and Place
//! Details APIs: debounced latest-wins suggestions, multi-strategy candidate
//! selection with accuracy classification, and environment guarding.

pub mod client;
pub mod error;
pub mod guard;
pub mod resolve;
mod retry;
pub mod suggest;
pub mod types;

pub use client::PlacesClient;
pub use error::{PlacesError, PrecisionIssue};
pub use guard::{AlwaysOnline, Connectivity, ServiceGuard};
pub use resolve::{validate_accuracy, Resolver};
pub use suggest::{SelectionCursor, SuggestConfig, SuggestSession, SuggestState};
pub use types::{
    AccuracyTier, LocationKind, ResolutionRequest, ResolutionResult, Suggestion,
};
