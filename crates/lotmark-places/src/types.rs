//! Provider wire types and the domain types built from them.
//!
//! Wire types model the mapping provider's JSON envelopes. Every envelope
//! carries a `status` string (`"OK"`, `"ZERO_RESULTS"`, or an error code)
//! next to the payload; fields the provider omits for sparse results are
//! `#[serde(default)]`.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AutocompleteResponse {
    pub status: String,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A single autocomplete prediction as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
    #[serde(default)]
    pub structured_formatting: Option<StructuredFormatting>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StructuredFormatting {
    #[serde(default)]
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeCandidate>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One raw geocoding result.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeCandidate {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(default)]
    pub location_type: Option<LocationType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Provider geometry precision, most precise first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LocationType {
    #[serde(rename = "ROOFTOP")]
    Rooftop,
    #[serde(rename = "RANGE_INTERPOLATED")]
    RangeInterpolated,
    #[serde(rename = "GEOMETRIC_CENTER")]
    GeometricCenter,
    #[serde(rename = "APPROXIMATE")]
    Approximate,
}

impl LocationType {
    /// Partition priority for candidate selection, best first.
    pub const PRIORITY: [LocationType; 4] = [
        LocationType::Rooftop,
        LocationType::RangeInterpolated,
        LocationType::GeometricCenter,
        LocationType::Approximate,
    ];
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

// ---------------------------------------------------------------------------
// Place Details
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// What a suggestion input field is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Address,
    City,
    Country,
}

impl LocationKind {
    /// The provider `types` filter for this kind of input.
    pub(crate) fn provider_types(self) -> &'static str {
        match self {
            LocationKind::Address => "address|establishment",
            LocationKind::City => "(cities)",
            LocationKind::Country => "country",
        }
    }

    /// How many suggestions a query of this kind may surface.
    #[must_use]
    pub fn result_cap(self) -> usize {
        match self {
            LocationKind::Address => 5,
            LocationKind::City | LocationKind::Country => 8,
        }
    }
}

/// A ranked location suggestion ready for display or promotion to a
/// [`ResolutionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub description: String,
    pub place_id: String,
    pub main_text: String,
    pub secondary_text: Option<String>,
    pub kinds: Vec<String>,
}

impl From<Prediction> for Suggestion {
    fn from(p: Prediction) -> Self {
        let (main_text, secondary_text) = match p.structured_formatting {
            Some(sf) if !sf.main_text.is_empty() => (sf.main_text, sf.secondary_text),
            _ => (p.description.clone(), None),
        };
        Self {
            description: p.description,
            place_id: p.place_id,
            main_text,
            secondary_text,
            kinds: p.types,
        }
    }
}

/// What to resolve. The two forms make the "place id, or full street
/// address" requirement a structural fact rather than a runtime check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionRequest {
    Address {
        street: String,
        city: String,
        country: String,
    },
    Place {
        place_id: String,
    },
}

/// Confidence classification for a resolved coordinate, ordered from least
/// to most trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccuracyTier {
    /// Geometric-center or coarser geometry; fails accuracy validation.
    Approximate,
    RangeInterpolated,
    /// Produced by the place-details fallback path.
    PlaceDetails,
    Good,
    High,
    Maximum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub lat: f64,
    pub lng: f64,
    pub tier: AccuracyTier,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
}
