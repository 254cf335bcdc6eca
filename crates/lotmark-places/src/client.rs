//! HTTP client for the mapping provider's Places and Geocoding REST APIs.
//!
//! Wraps `reqwest` with provider-specific error handling, credential
//! injection, and typed response deserialization. Every endpoint checks the
//! `"status"` field in the JSON envelope: `"OK"` and `"ZERO_RESULTS"` are
//! successes (the latter with an empty payload), anything else surfaces as
//! [`PlacesError::Provider`]. Data calls are single-attempt: a failed call
//! is reported to the caller, never silently retried.

use std::time::Duration;

use reqwest::{Client, Url};

use lotmark_core::ApiKey;

use crate::error::PlacesError;
use crate::types::{
    AutocompleteResponse, GeocodeCandidate, GeocodeResponse, LocationKind, PlaceDetails,
    PlaceDetailsResponse, Prediction,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

const AUTOCOMPLETE_ENDPOINT: &str = "place/autocomplete/json";
const GEOCODE_ENDPOINT: &str = "geocode/json";
const PLACE_DETAILS_ENDPOINT: &str = "place/details/json";

/// Client for the mapping provider's Places and Geocoding APIs.
///
/// Holds the HTTP client, the credential the session was built with, and the
/// base URL. Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
///
/// The credential is bound at construction; changing keys requires building
/// a new client.
pub struct PlacesClient {
    client: Client,
    key: ApiKey,
    base_url: Url,
}

impl PlacesClient {
    /// Creates a new client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(key: ApiKey, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Provider`] if `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        key: ApiKey,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: the base URL must end with exactly one slash so endpoint
        // joins append path segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::Provider {
            status: "INVALID_BASE_URL".to_string(),
            message: format!("'{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            key,
            base_url,
        })
    }

    /// Fetches autocomplete predictions for a partial input.
    ///
    /// `kind` selects the provider `types` filter; `country` optionally
    /// restricts results to one ISO 3166-1 alpha-2 country.
    ///
    /// Zero predictions is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Provider`] if the provider returns an error status.
    /// - [`PlacesError::Transport`] on network failure, timeout, or non-2xx.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn autocomplete(
        &self,
        input: &str,
        kind: LocationKind,
        country: Option<&str>,
    ) -> Result<Vec<Prediction>, PlacesError> {
        let mut params = vec![("input", input), ("types", kind.provider_types())];
        let components;
        if let Some(code) = country {
            components = format!("country:{code}");
            params.push(("components", &components));
        }

        let url = self.build_url(AUTOCOMPLETE_ENDPOINT, &params)?;
        let response: AutocompleteResponse =
            self.request_json(&url, AUTOCOMPLETE_ENDPOINT).await?;
        Self::check_status(
            AUTOCOMPLETE_ENDPOINT,
            &response.status,
            response.error_message.as_deref(),
        )?;

        Ok(response.predictions)
    }

    /// Issues a structured geocoding query for a street address, with
    /// locality and country component hints.
    ///
    /// Returns the provider's raw candidate list; selection and accuracy
    /// classification are the resolver's job.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Provider`] if the provider returns an error status.
    /// - [`PlacesError::Transport`] on network failure, timeout, or non-2xx.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn geocode_address(
        &self,
        street: &str,
        city: &str,
        country: &str,
    ) -> Result<Vec<GeocodeCandidate>, PlacesError> {
        let components = format!("locality:{city}|country:{country}");
        let url = self.build_url(
            GEOCODE_ENDPOINT,
            &[("address", street), ("components", &components)],
        )?;
        let response: GeocodeResponse = self.request_json(&url, GEOCODE_ENDPOINT).await?;
        Self::check_status(
            GEOCODE_ENDPOINT,
            &response.status,
            response.error_message.as_deref(),
        )?;

        Ok(response.results)
    }

    /// Geocodes by place identifier (a committed suggestion).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`PlacesClient::geocode_address`].
    pub async fn geocode_place(
        &self,
        place_id: &str,
    ) -> Result<Vec<GeocodeCandidate>, PlacesError> {
        let url = self.build_url(GEOCODE_ENDPOINT, &[("place_id", place_id)])?;
        let response: GeocodeResponse = self.request_json(&url, GEOCODE_ENDPOINT).await?;
        Self::check_status(
            GEOCODE_ENDPOINT,
            &response.status,
            response.error_message.as_deref(),
        )?;

        Ok(response.results)
    }

    /// Fetches full place details for a place identifier (the resolver's
    /// fallback path when geocoding yields no usable candidate).
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NoResults`] if the provider knows no such place.
    /// - [`PlacesError::Provider`] if the provider returns an error status.
    /// - [`PlacesError::Transport`] on network failure, timeout, or non-2xx.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            PLACE_DETAILS_ENDPOINT,
            &[
                ("place_id", place_id),
                (
                    "fields",
                    "place_id,geometry,formatted_address,address_component",
                ),
            ],
        )?;
        let response: PlaceDetailsResponse =
            self.request_json(&url, PLACE_DETAILS_ENDPOINT).await?;
        Self::check_status(
            PLACE_DETAILS_ENDPOINT,
            &response.status,
            response.error_message.as_deref(),
        )?;

        response.result.ok_or(PlacesError::NoResults)
    }

    /// Lightweight reachability probe used by the readiness guard.
    ///
    /// Sends a parameterless geocoding request; any well-formed envelope —
    /// including an error status — proves the service is up and reachable,
    /// so the envelope status is deliberately not checked.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Transport`] on network failure, timeout, or non-2xx.
    /// - [`PlacesError::Deserialize`] if the body is not a provider envelope.
    pub async fn probe(&self) -> Result<(), PlacesError> {
        let url = self.build_url(GEOCODE_ENDPOINT, &[])?;
        let _: GeocodeResponse = self.request_json(&url, "probe").await?;
        Ok(())
    }

    /// Builds the full request URL with percent-encoded query parameters and
    /// the session credential appended last.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::Provider {
                status: "INVALID_BASE_URL".to_string(),
                message: format!("cannot join endpoint '{endpoint}': {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", self.key.expose());
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body.
    ///
    /// Logs carry only the endpoint name — the full URL embeds the
    /// credential and must never reach the log stream.
    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        endpoint: &str,
    ) -> Result<T, PlacesError> {
        tracing::debug!(endpoint, "provider request");
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: endpoint.to_string(),
            source: e,
        })
    }

    /// Maps the envelope status to a result. `OK` and `ZERO_RESULTS` pass;
    /// everything else is a provider-level failure.
    fn check_status(
        endpoint: &str,
        status: &str,
        error_message: Option<&str>,
    ) -> Result<(), PlacesError> {
        match status {
            "OK" | "ZERO_RESULTS" => Ok(()),
            other => {
                tracing::warn!(endpoint, status = other, "provider rejected request");
                Err(PlacesError::Provider {
                    status: other.to_string(),
                    message: error_message.unwrap_or("no detail provided").to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
