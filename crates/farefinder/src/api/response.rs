//! Decoding of provider response bodies.
//!
//! Only the fields the front end reads are required. Everything the
//! provider nests around them is optional in the envelope types below.

use serde::Deserialize;
use tracing::debug;

use crate::airport::AirportOption;
use crate::error::{Error, Result};
use crate::itinerary::Itinerary;

/// Common wrapper: `{ status, message, data }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    data: Option<T>,
}

impl<T> Envelope<T> {
    /// Turn an explicit `status: false` into an API error.
    fn check(self, provider: &'static str) -> Result<Option<T>> {
        if self.status == Some(false) {
            let message = match self.message {
                Some(serde_json::Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => "request rejected".to_string(),
            };
            return Err(Error::api(provider, None, message));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FlightsData {
    #[serde(default)]
    itineraries: Option<Vec<Itinerary>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AirportRecord {
    #[serde(default)]
    entity_id: String,
    #[serde(default)]
    sky_id: String,
    presentation: Presentation,
}

#[derive(Debug, Deserialize)]
struct Presentation {
    title: String,
}

fn decode<T: for<'de> Deserialize<'de>>(provider: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::malformed(provider, e.to_string()))
}

/// Decode a flight search body into itineraries.
///
/// Missing `data` or `data.itineraries` yields an empty list. Every returned
/// itinerary has at least one leg with at least one marketing carrier.
///
/// # Errors
///
/// Returns [`Error::Api`] for a `status: false` envelope and
/// [`Error::MalformedResponse`] for anything that does not match the
/// itinerary shape.
pub fn parse_flights_response(body: &str) -> Result<Vec<Itinerary>> {
    let envelope: Envelope<FlightsData> = decode("flights", body)?;
    let itineraries = envelope
        .check("flights")?
        .unwrap_or_default()
        .itineraries
        .unwrap_or_default();

    for itinerary in &itineraries {
        itinerary.validate()?;
    }
    debug!(count = itineraries.len(), "decoded itineraries");
    Ok(itineraries)
}

/// Decode an airport search body into options.
///
/// Records with an empty entity id or sky id are skipped.
///
/// # Errors
///
/// Returns [`Error::Api`] for a `status: false` envelope and
/// [`Error::MalformedResponse`] when `data` is missing or mis-shaped.
pub fn parse_airports_response(body: &str) -> Result<Vec<AirportOption>> {
    let envelope: Envelope<Vec<AirportRecord>> = decode("airports", body)?;
    let records = envelope
        .check("airports")?
        .ok_or_else(|| Error::malformed("airports", "missing `data`"))?;

    let options: Vec<AirportOption> = records
        .iter()
        .filter_map(|record| {
            match AirportOption::from_provider(
                &record.entity_id,
                &record.sky_id,
                &record.presentation.title,
            ) {
                Ok(option) => Some(option),
                Err(e) => {
                    debug!(title = %record.presentation.title, "skipping airport: {e}");
                    None
                }
            }
        })
        .collect();
    Ok(options)
}
