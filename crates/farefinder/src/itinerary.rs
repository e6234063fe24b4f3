//! Itineraries as returned by the flight search provider.
//!
//! Field names follow the provider's camelCase JSON. Only the fields the
//! front end reads are modelled; everything else in the payload is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A priced, bookable grouping of one or more legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// Provider identifier, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Legs in travel order. Only the first is displayed.
    pub legs: Vec<Leg>,
    /// Price as supplied by the provider.
    pub price: Price,
}

/// Provider price. `formatted` is shown verbatim and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Display string, e.g. `$1,234`.
    pub formatted: String,
    /// Numeric amount, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<f64>,
}

/// One directional flight segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    /// Departure place.
    pub origin: Place,
    /// Arrival place.
    pub destination: Place,
    /// Departure timestamp (ISO 8601, usually without offset).
    pub departure: String,
    /// Arrival timestamp (ISO 8601, usually without offset).
    pub arrival: String,
    /// Flight time in minutes.
    pub duration_in_minutes: u32,
    /// Number of intermediate stops.
    pub stop_count: u32,
    /// Carriers selling this leg.
    pub carriers: Carriers,
}

/// A place reference inside a leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Short code shown to the user, e.g. `LHR`.
    pub display_code: String,
}

/// Carrier lists for a leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carriers {
    /// Marketing carriers in provider order.
    pub marketing: Vec<Carrier>,
}

/// An airline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carrier {
    /// Airline name.
    pub name: String,
    /// Short airline code.
    pub alternate_id: String,
    /// Logo image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Itinerary {
    /// The displayed leg.
    #[must_use]
    pub fn first_leg(&self) -> Option<&Leg> {
        self.legs.first()
    }

    /// The displayed carrier of the displayed leg.
    #[must_use]
    pub fn first_carrier(&self) -> Option<&Carrier> {
        self.first_leg().and_then(Leg::first_carrier)
    }

    /// Check that the fields the front end reads are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if there is no leg or the first
    /// leg has no marketing carrier.
    pub fn validate(&self) -> Result<()> {
        let leg = self
            .first_leg()
            .ok_or_else(|| Error::malformed("flights", "itinerary has no legs"))?;
        if leg.first_carrier().is_none() {
            return Err(Error::malformed(
                "flights",
                format!(
                    "leg {} -> {} has no marketing carrier",
                    leg.origin.display_code, leg.destination.display_code
                ),
            ));
        }
        Ok(())
    }
}

impl Leg {
    /// The displayed carrier.
    #[must_use]
    pub fn first_carrier(&self) -> Option<&Carrier> {
        self.carriers.marketing.first()
    }

    /// `ORIGIN → DESTINATION`.
    #[must_use]
    pub fn route(&self) -> String {
        format!(
            "{} → {}",
            self.origin.display_code, self.destination.display_code
        )
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::itinerary;
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "13542-2406011025--32132-0-12712-2406011340",
        "price": { "raw": 412.5, "formatted": "$413" },
        "legs": [{
            "origin": { "id": "LHR", "displayCode": "LHR", "name": "London Heathrow" },
            "destination": { "id": "JFK", "displayCode": "JFK" },
            "departure": "2024-06-01T10:25:00",
            "arrival": "2024-06-01T13:40:00",
            "durationInMinutes": 495,
            "stopCount": 0,
            "carriers": {
                "marketing": [{
                    "id": -32132,
                    "name": "British Airways",
                    "alternateId": "BA",
                    "logoUrl": "https://logos.skyscnr.com/images/airlines/favicon/BA.png"
                }],
                "operationType": "fully_operated"
            }
        }]
    }"#;

    #[test]
    fn test_deserialize_provider_itinerary() {
        let it: Itinerary = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(it.price.formatted, "$413");
        assert_eq!(it.price.raw, Some(412.5));
        let leg = it.first_leg().unwrap();
        assert_eq!(leg.route(), "LHR → JFK");
        assert_eq!(leg.duration_in_minutes, 495);
        assert_eq!(leg.stop_count, 0);
        assert_eq!(it.first_carrier().unwrap().alternate_id, "BA");
        assert!(it.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_legs() {
        let mut it = itinerary("LHR", "JFK", "2024-06-01T10:25:00", "$413");
        it.legs.clear();

        let err = it.validate().unwrap_err();
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("no legs"));
    }

    #[test]
    fn test_validate_rejects_missing_carrier() {
        let mut it = itinerary("LHR", "JFK", "2024-06-01T10:25:00", "$413");
        it.legs[0].carriers.marketing.clear();

        let err = it.validate().unwrap_err();
        assert!(err.to_string().contains("LHR -> JFK"));
        assert!(it.first_carrier().is_none());
    }

    #[test]
    fn test_missing_required_field_fails_to_parse() {
        let result: std::result::Result<Itinerary, _> =
            serde_json::from_str(r#"{ "legs": [], "price": {} }"#);
        assert!(result.is_err());
    }
}
