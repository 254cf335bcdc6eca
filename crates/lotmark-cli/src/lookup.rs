//! Suggestion, resolution, and readiness subcommands.

use std::time::Duration;

use anyhow::bail;

use lotmark_core::AppConfig;
use lotmark_places::{
    LocationKind, PlacesError, ResolutionRequest, Resolver, SuggestConfig, SuggestSession,
};

use crate::context;

pub async fn suggest(
    config: &AppConfig,
    kind: LocationKind,
    country: Option<String>,
    text: &str,
) -> anyhow::Result<()> {
    let manager = context::build_manager(config)?;
    let client = context::build_client(config, &manager)?;

    let mut suggest_config =
        SuggestConfig::new(kind).with_debounce(Duration::from_millis(config.suggest_debounce_ms));
    if let Some(code) = country.or_else(|| config.country_restriction.clone()) {
        suggest_config = suggest_config.with_country(code);
    }

    let session = SuggestSession::new(client, context::guard(), suggest_config);
    let Some(outcome) = session.submit(text).await else {
        // Single-shot submission; nothing can supersede it.
        bail!("suggestion query was superseded");
    };
    let suggestions = outcome?;

    if suggestions.is_empty() {
        println!("no suggestions");
        return Ok(());
    }
    for (i, s) in suggestions.iter().enumerate() {
        match &s.secondary_text {
            Some(secondary) => println!("{:>2}. {} — {}", i + 1, s.main_text, secondary),
            None => println!("{:>2}. {}", i + 1, s.main_text),
        }
    }
    Ok(())
}

pub async fn resolve(
    config: &AppConfig,
    place_id: Option<String>,
    street: Option<String>,
    city: Option<String>,
    country: Option<String>,
) -> anyhow::Result<()> {
    let request = match (place_id, street, city, country) {
        (Some(place_id), None, None, None) => ResolutionRequest::Place { place_id },
        (None, Some(street), Some(city), Some(country)) => ResolutionRequest::Address {
            street,
            city,
            country,
        },
        _ => bail!("pass either --place-id or all of --street, --city, --country"),
    };

    let manager = context::build_manager(config)?;
    let client = context::build_client(config, &manager)?;
    let resolver = Resolver::new(client, context::guard());

    match resolver.resolve(&request).await {
        Ok(result) => {
            println!("{:.8}, {:.8}  [{:?}]", result.lat, result.lng, result.tier);
            if let Some(address) = &result.formatted_address {
                println!("{address}");
            }
        }
        Err(PlacesError::LowPrecision { result, reason }) => {
            // Soft failure: the coordinate is shown, flagged as low confidence.
            println!("{:.8}, {:.8}  [{:?}]", result.lat, result.lng, result.tier);
            println!("warning: low-precision result ({reason})");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

pub async fn check(config: &AppConfig) -> anyhow::Result<()> {
    let manager = context::build_manager(config)?;
    let client = context::build_client(config, &manager)?;
    let guard = context::guard();

    match guard.initialize(&client, config.readiness_max_attempts).await {
        Ok(()) => println!("mapping service is reachable"),
        Err(err) => {
            println!("mapping service is unavailable: {err}");
            std::process::exit(1);
        }
    }
    Ok(())
}
