//! Submitted search criteria and the flight queries derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::airport::AirportToken;

/// Date format used on the wire and in the criteria snapshot.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An immutable snapshot of the form, taken when the user presses Search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    origin: AirportToken,
    destination: AirportToken,
    departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    return_date: Option<NaiveDate>,
    passenger_count: u8,
}

impl SearchCriteria {
    /// Freeze a set of form values.
    #[must_use]
    pub fn new(
        origin: AirportToken,
        destination: AirportToken,
        departure_date: NaiveDate,
        return_date: Option<NaiveDate>,
        passenger_count: u8,
    ) -> Self {
        Self {
            origin,
            destination,
            departure_date,
            return_date,
            passenger_count,
        }
    }

    /// Origin token.
    #[must_use]
    pub fn origin(&self) -> &AirportToken {
        &self.origin
    }

    /// Destination token.
    #[must_use]
    pub fn destination(&self) -> &AirportToken {
        &self.destination
    }

    /// Departure date as `YYYY-MM-DD`.
    #[must_use]
    pub fn departure_date(&self) -> String {
        self.departure_date.format(DATE_FORMAT).to_string()
    }

    /// Return date as `YYYY-MM-DD`, if this is a round trip.
    #[must_use]
    pub fn return_date(&self) -> Option<String> {
        self.return_date.map(|d| d.format(DATE_FORMAT).to_string())
    }

    /// Passenger count as sent to the provider.
    #[must_use]
    pub fn passenger_count(&self) -> String {
        self.passenger_count.to_string()
    }

    /// Whether a return leg will be searched.
    #[must_use]
    pub fn is_round_trip(&self) -> bool {
        self.return_date.is_some()
    }

    /// Query for the outbound leg: origin to destination on the departure date.
    #[must_use]
    pub fn outbound_query(&self) -> FlightQuery {
        FlightQuery::between(
            &self.origin,
            &self.destination,
            self.departure_date(),
            self.passenger_count(),
        )
    }

    /// Query for the return leg: destination back to origin on the return
    /// date. `None` for one-way trips.
    #[must_use]
    pub fn return_query(&self) -> Option<FlightQuery> {
        self.return_date().map(|date| {
            FlightQuery::between(
                &self.destination,
                &self.origin,
                date,
                self.passenger_count(),
            )
        })
    }
}

/// Per-leg flight search parameters, serialized as the provider's query
/// string names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightQuery {
    /// Departure location code.
    pub origin_sky_id: String,
    /// Arrival location code.
    pub destination_sky_id: String,
    /// Departure entity id.
    pub origin_entity_id: String,
    /// Arrival entity id.
    pub destination_entity_id: String,
    /// Travel date, `YYYY-MM-DD`.
    pub date: String,
    /// Adult passenger count.
    pub adults: String,
}

impl FlightQuery {
    fn between(from: &AirportToken, to: &AirportToken, date: String, adults: String) -> Self {
        Self {
            origin_sky_id: from.sky_id().to_string(),
            destination_sky_id: to.sky_id().to_string(),
            origin_entity_id: from.entity_id().to_string(),
            destination_entity_id: to.entity_id().to_string(),
            date,
            adults,
        }
    }
}
