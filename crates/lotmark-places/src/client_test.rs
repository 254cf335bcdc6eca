use lotmark_core::ApiKey;

use super::*;

const TEST_KEY: &str = "AIzaTestKey_0000000000000000000000";

fn test_client(base_url: &str) -> PlacesClient {
    let key = ApiKey::parse(TEST_KEY).expect("test key should be well-formed");
    PlacesClient::with_base_url(key, 30, "lotmark-test/0.1", base_url)
        .expect("client construction should not fail")
}

#[test]
fn build_url_appends_credential_last() {
    let client = test_client("https://maps.example.com/api");
    let url = client
        .build_url("geocode/json", &[("address", "1 Main St")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        format!("https://maps.example.com/api/geocode/json?address=1+Main+St&key={TEST_KEY}")
    );
}

#[test]
fn build_url_strips_trailing_slash() {
    let client = test_client("https://maps.example.com/api/");
    let url = client.build_url("place/details/json", &[]).unwrap();
    assert!(url
        .as_str()
        .starts_with("https://maps.example.com/api/place/details/json?"));
}

#[test]
fn build_url_encodes_special_characters() {
    let client = test_client("https://maps.example.com");
    let url = client
        .build_url("geocode/json", &[("components", "locality:São Paulo|country:br")])
        .unwrap();
    assert!(
        url.as_str().contains("S%C3%A3o"),
        "components should be percent-encoded: {url}"
    );
    assert!(
        !url.as_str().contains('|'),
        "pipe separator should be percent-encoded: {url}"
    );
}

#[test]
fn check_status_accepts_ok_and_zero_results() {
    assert!(PlacesClient::check_status("geocode/json", "OK", None).is_ok());
    assert!(PlacesClient::check_status("geocode/json", "ZERO_RESULTS", None).is_ok());
}

#[test]
fn check_status_maps_error_statuses() {
    let err = PlacesClient::check_status(
        "place/autocomplete/json",
        "REQUEST_DENIED",
        Some("The provided API key is invalid."),
    )
    .unwrap_err();
    match err {
        PlacesError::Provider { status, message } => {
            assert_eq!(status, "REQUEST_DENIED");
            assert!(message.contains("invalid"));
        }
        other => panic!("expected Provider error, got: {other:?}"),
    }
}

#[test]
fn invalid_base_url_is_rejected() {
    let key = ApiKey::parse(TEST_KEY).unwrap();
    let result = PlacesClient::with_base_url(key, 30, "lotmark-test/0.1", "not a url");
    assert!(matches!(result, Err(PlacesError::Provider { .. })));
}
