//! Address resolution: geocoding, candidate selection, and accuracy
//! classification.
//!
//! A resolution is a single pass through the provider — no automatic
//! retries; the caller re-invokes after editing input. Selection and
//! classification are pure functions over the raw candidate list so the
//! decision logic is testable without a server.

use std::sync::Arc;

use crate::client::PlacesClient;
use crate::error::{PlacesError, PrecisionIssue};
use crate::guard::ServiceGuard;
use crate::types::{
    AccuracyTier, AddressComponent, GeocodeCandidate, LocationType, PlaceDetails,
    ResolutionRequest, ResolutionResult,
};

/// Result types the resolver treats as street-address-level granularity.
const ACCEPTED_RESULT_TYPES: &[&str] = &["street_address", "premise", "subpremise"];

/// Fractional digits a coordinate must carry to pass validation.
const MIN_FRACTIONAL_DIGITS: u32 = 5;

/// Coordinates are rounded to this many decimals before validation.
const COORDINATE_DECIMALS: i32 = 8;

pub struct Resolver {
    client: Arc<PlacesClient>,
    guard: Arc<ServiceGuard>,
}

impl Resolver {
    #[must_use]
    pub fn new(client: Arc<PlacesClient>, guard: Arc<ServiceGuard>) -> Self {
        Self { client, guard }
    }

    /// Resolves a request to a coordinate with an accuracy classification.
    ///
    /// Address requests issue one structured geocoding query; place
    /// requests geocode by identifier. When geocoding yields candidates but
    /// none of street-address quality, the resolver falls back to a place
    /// details lookup on the first candidate carrying a place identifier.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ServiceUnavailable`] — offline or failed readiness;
    ///   no network call is made.
    /// - [`PlacesError::NoResults`] — zero candidates at every stage.
    /// - [`PlacesError::Transport`] / [`PlacesError::Provider`] /
    ///   [`PlacesError::Deserialize`] — the underlying call failed.
    /// - [`PlacesError::LowPrecision`] — the result exists but fails
    ///   accuracy validation; the error carries the coordinate so the
    ///   caller can still use it behind a warning.
    pub async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResult, PlacesError> {
        self.guard.check()?;

        let (candidates, street, city) = match request {
            ResolutionRequest::Address {
                street,
                city,
                country,
            } => (
                self.client.geocode_address(street, city, country).await?,
                street.as_str(),
                city.as_str(),
            ),
            ResolutionRequest::Place { place_id } => {
                (self.client.geocode_place(place_id).await?, "", "")
            }
        };

        if candidates.is_empty() {
            return Err(PlacesError::NoResults);
        }

        if let Some(best) = select_candidate(&candidates, street, city) {
            let tier = classify_accuracy(best);
            return finish(
                best.geometry.location.lat,
                best.geometry.location.lng,
                tier,
                best.formatted_address.clone(),
                best.place_id.clone(),
            );
        }

        // No candidate of street-address quality; fall back to full place
        // details on the first raw candidate that carries an identifier.
        let Some(place_id) = candidates.iter().find_map(|c| c.place_id.clone()) else {
            return Err(PlacesError::NoResults);
        };
        tracing::debug!("no usable geocode candidate — falling back to place details");
        let details = self.client.place_details(&place_id).await?;
        finish_details(&details)
    }
}

fn finish_details(details: &PlaceDetails) -> Result<ResolutionResult, PlacesError> {
    finish(
        details.geometry.location.lat,
        details.geometry.location.lng,
        AccuracyTier::PlaceDetails,
        details.formatted_address.clone(),
        Some(details.place_id.clone()),
    )
}

fn finish(
    lat: f64,
    lng: f64,
    tier: AccuracyTier,
    formatted_address: Option<String>,
    place_id: Option<String>,
) -> Result<ResolutionResult, PlacesError> {
    let result = ResolutionResult {
        lat: round_coordinate(lat),
        lng: round_coordinate(lng),
        tier,
        formatted_address,
        place_id,
    };
    match validate_accuracy(&result) {
        Ok(()) => Ok(result),
        Err(reason) => Err(PlacesError::LowPrecision { result, reason }),
    }
}

/// Picks the best candidate, or `None` when nothing is of street-address
/// quality.
///
/// Candidates are first filtered to accepted result types with Rooftop or
/// RangeInterpolated geometry, then partitioned by location type in
/// priority order; scoring happens only within the best non-empty
/// partition. Ties keep the first candidate encountered.
fn select_candidate<'a>(
    candidates: &'a [GeocodeCandidate],
    street: &str,
    city: &str,
) -> Option<&'a GeocodeCandidate> {
    let usable: Vec<&GeocodeCandidate> = candidates.iter().filter(|c| is_usable(c)).collect();

    for location_type in LocationType::PRIORITY {
        let partition: Vec<&GeocodeCandidate> = usable
            .iter()
            .copied()
            .filter(|c| c.geometry.location_type == Some(location_type))
            .collect();
        if partition.is_empty() {
            continue;
        }

        let mut best = partition[0];
        let mut best_score = score_candidate(best, street, city);
        for &candidate in &partition[1..] {
            let score = score_candidate(candidate, street, city);
            if score > best_score {
                best = candidate;
                best_score = score;
            }
        }
        return Some(best);
    }

    None
}

fn is_usable(candidate: &GeocodeCandidate) -> bool {
    let street_level = candidate
        .types
        .iter()
        .any(|t| ACCEPTED_RESULT_TYPES.contains(&t.as_str()));
    let precise_geometry = matches!(
        candidate.geometry.location_type,
        Some(LocationType::Rooftop | LocationType::RangeInterpolated)
    );
    street_level && precise_geometry
}

/// Scores a candidate against the input address.
///
/// +40 when the returned street number appears in the input street text,
/// +30 when the returned route name is a case-insensitive substring of it,
/// +20 when the returned locality equals the input city,
/// +10 when a premise-level component is present.
fn score_candidate(candidate: &GeocodeCandidate, street: &str, city: &str) -> u32 {
    let street_lower = street.to_lowercase();
    let mut score = 0;

    if let Some(number) = component(candidate, "street_number") {
        if street_lower.contains(&number.long_name.to_lowercase()) {
            score += 40;
        }
    }
    if let Some(route) = component(candidate, "route") {
        if !route.long_name.is_empty() && street_lower.contains(&route.long_name.to_lowercase()) {
            score += 30;
        }
    }
    if let Some(locality) = component(candidate, "locality") {
        if locality.long_name.eq_ignore_ascii_case(city) {
            score += 20;
        }
    }
    if component(candidate, "premise").is_some() {
        score += 10;
    }

    score
}

/// Classifies a candidate's accuracy from its geometry and components.
///
/// Rooftop geometry with a street number reaches High, or Maximum when a
/// premise component and at least six address components confirm a fully
/// described building. Rooftop without a street number is Good.
/// Range-interpolated geometry keeps its own tier; anything coarser is
/// Approximate.
fn classify_accuracy(candidate: &GeocodeCandidate) -> AccuracyTier {
    let has_street_number = component(candidate, "street_number").is_some();
    let has_premise = component(candidate, "premise").is_some();
    let fully_described = candidate.address_components.len() >= 6;

    match candidate.geometry.location_type {
        Some(LocationType::Rooftop) => {
            if has_street_number && has_premise && fully_described {
                AccuracyTier::Maximum
            } else if has_street_number {
                AccuracyTier::High
            } else {
                AccuracyTier::Good
            }
        }
        Some(LocationType::RangeInterpolated) => AccuracyTier::RangeInterpolated,
        _ => AccuracyTier::Approximate,
    }
}

fn component<'a>(candidate: &'a GeocodeCandidate, kind: &str) -> Option<&'a AddressComponent> {
    candidate
        .address_components
        .iter()
        .find(|c| c.types.iter().any(|t| t == kind))
}

/// Validates a resolution result's precision.
///
/// Both coordinates must carry at least five fractional digits, and the
/// tier must be above [`AccuracyTier::Approximate`].
///
/// # Errors
///
/// Returns the first [`PrecisionIssue`] found.
pub fn validate_accuracy(result: &ResolutionResult) -> Result<(), PrecisionIssue> {
    let lat_digits = fractional_digits(result.lat);
    if lat_digits < MIN_FRACTIONAL_DIGITS {
        return Err(PrecisionIssue::CoarseCoordinate {
            axis: "latitude",
            digits: lat_digits,
        });
    }
    let lng_digits = fractional_digits(result.lng);
    if lng_digits < MIN_FRACTIONAL_DIGITS {
        return Err(PrecisionIssue::CoarseCoordinate {
            axis: "longitude",
            digits: lng_digits,
        });
    }
    if result.tier <= AccuracyTier::Approximate {
        return Err(PrecisionIssue::CoarseTier);
    }
    Ok(())
}

fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_DECIMALS);
    (value * factor).round() / factor
}

/// Significant fractional digits after rounding to the coordinate width.
fn fractional_digits(value: f64) -> u32 {
    let formatted = format!("{value:.8}");
    let trimmed = formatted.trim_end_matches('0');
    match trimmed.split_once('.') {
        Some((_, frac)) => u32::try_from(frac.len()).unwrap_or(u32::MAX),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Geometry, LatLng};

    fn comp(long_name: &str, kind: &str) -> AddressComponent {
        AddressComponent {
            long_name: long_name.to_string(),
            short_name: long_name.to_string(),
            types: vec![kind.to_string()],
        }
    }

    fn candidate(
        location_type: LocationType,
        lat: f64,
        lng: f64,
        components: Vec<AddressComponent>,
    ) -> GeocodeCandidate {
        GeocodeCandidate {
            geometry: Geometry {
                location: LatLng { lat, lng },
                location_type: Some(location_type),
            },
            formatted_address: Some("somewhere".to_string()),
            address_components: components,
            place_id: Some("pl-test".to_string()),
            types: vec!["street_address".to_string()],
        }
    }

    #[test]
    fn fractional_digits_counts_significant_decimals() {
        assert_eq!(fractional_digits(12.3), 1);
        assert_eq!(fractional_digits(51.52377), 5);
        assert_eq!(fractional_digits(52.0), 0);
        assert_eq!(fractional_digits(-0.000042), 6);
    }

    #[test]
    fn round_coordinate_truncates_to_eight_decimals() {
        assert!((round_coordinate(51.123_456_789_12) - 51.123_456_79).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_coarse_coordinate_regardless_of_tier() {
        let result = ResolutionResult {
            lat: 12.3,
            lng: -0.127_58,
            tier: AccuracyTier::Maximum,
            formatted_address: None,
            place_id: None,
        };
        assert_eq!(
            validate_accuracy(&result),
            Err(PrecisionIssue::CoarseCoordinate {
                axis: "latitude",
                digits: 1
            })
        );
    }

    #[test]
    fn validate_rejects_approximate_tier() {
        let result = ResolutionResult {
            lat: 51.523_77,
            lng: -0.158_56,
            tier: AccuracyTier::Approximate,
            formatted_address: None,
            place_id: None,
        };
        assert_eq!(validate_accuracy(&result), Err(PrecisionIssue::CoarseTier));
    }

    #[test]
    fn validate_accepts_precise_interpolated_result() {
        let result = ResolutionResult {
            lat: 51.523_77,
            lng: -0.158_56,
            tier: AccuracyTier::RangeInterpolated,
            formatted_address: None,
            place_id: None,
        };
        assert!(validate_accuracy(&result).is_ok());
    }

    #[test]
    fn scoring_rewards_street_number_route_locality_and_premise() {
        let c = candidate(
            LocationType::Rooftop,
            51.523_77,
            -0.158_56,
            vec![
                comp("221B", "street_number"),
                comp("Baker Street", "route"),
                comp("London", "locality"),
                comp("The Sherlock Holmes Museum", "premise"),
            ],
        );
        assert_eq!(score_candidate(&c, "221B Baker Street", "London"), 100);
        assert_eq!(score_candidate(&c, "10 Downing Street", "Paris"), 10);
    }

    #[test]
    fn rooftop_partition_beats_higher_scoring_interpolated_candidate() {
        let rooftop = candidate(
            LocationType::Rooftop,
            51.523_77,
            -0.158_56,
            vec![comp("221B", "street_number")],
        );
        let interpolated = candidate(
            LocationType::RangeInterpolated,
            51.523_00,
            -0.158_00,
            vec![
                comp("221B", "street_number"),
                comp("Baker Street", "route"),
                comp("London", "locality"),
            ],
        );
        let binding = [interpolated, rooftop.clone()];
        let picked = select_candidate(
            &binding,
            "221B Baker Street",
            "London",
        )
        .unwrap();
        assert_eq!(
            picked.geometry.location_type,
            Some(LocationType::Rooftop),
            "the rooftop partition must win even at a lower score"
        );
        assert!((picked.geometry.location.lat - rooftop.geometry.location.lat).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let first = candidate(LocationType::Rooftop, 1.000_01, 2.000_01, vec![]);
        let second = candidate(LocationType::Rooftop, 3.000_01, 4.000_01, vec![]);
        let binding = [first, second];
        let picked = select_candidate(&binding, "somewhere", "nowhere").unwrap();
        assert!((picked.geometry.location.lat - 1.000_01).abs() < 1e-9);
    }

    #[test]
    fn unusable_candidates_are_filtered_out() {
        let geometric = candidate(LocationType::GeometricCenter, 1.0, 2.0, vec![]);
        let mut wrong_type = candidate(LocationType::Rooftop, 1.0, 2.0, vec![]);
        wrong_type.types = vec!["locality".to_string()];
        assert!(select_candidate(&[geometric, wrong_type], "x", "y").is_none());
    }

    #[test]
    fn baker_street_scenario_picks_rooftop_and_tiers_high() {
        let rooftop = candidate(
            LocationType::Rooftop,
            51.523_77,
            -0.158_56,
            vec![
                comp("221B", "street_number"),
                comp("Baker Street", "route"),
                comp("London", "locality"),
            ],
        );
        let interpolated = candidate(
            LocationType::RangeInterpolated,
            51.523_00,
            -0.158_00,
            vec![comp("Baker Street", "route")],
        );
        let binding = [rooftop, interpolated];
        let picked = select_candidate(
            &binding,
            "221B Baker Street",
            "London",
        )
        .unwrap();
        assert_eq!(classify_accuracy(picked), AccuracyTier::High);
    }

    #[test]
    fn fully_described_rooftop_classifies_maximum() {
        let c = candidate(
            LocationType::Rooftop,
            51.523_77,
            -0.158_56,
            vec![
                comp("221B", "street_number"),
                comp("Baker Street", "route"),
                comp("London", "locality"),
                comp("The Sherlock Holmes Museum", "premise"),
                comp("Greater London", "administrative_area_level_2"),
                comp("United Kingdom", "country"),
            ],
        );
        assert_eq!(classify_accuracy(&c), AccuracyTier::Maximum);
    }

    #[test]
    fn rooftop_without_street_number_classifies_good() {
        let c = candidate(
            LocationType::Rooftop,
            51.5,
            -0.15,
            vec![comp("Baker Street", "route")],
        );
        assert_eq!(classify_accuracy(&c), AccuracyTier::Good);
    }

    #[test]
    fn interpolated_and_coarser_keep_their_tiers() {
        let interpolated = candidate(LocationType::RangeInterpolated, 51.5, -0.15, vec![]);
        assert_eq!(
            classify_accuracy(&interpolated),
            AccuracyTier::RangeInterpolated
        );
        let approximate = candidate(LocationType::Approximate, 51.5, -0.15, vec![]);
        assert_eq!(classify_accuracy(&approximate), AccuracyTier::Approximate);
    }
}
