//! Flight data provider access.
//!
//! The lookup and the selection flow only see the two traits defined here,
//! so both can be driven by in-memory fakes. [`SkyScrapperClient`] is the
//! HTTP implementation used by the binary.

mod client;
mod response;

use async_trait::async_trait;

use crate::airport::AirportOption;
use crate::criteria::FlightQuery;
use crate::error::Result;
use crate::itinerary::Itinerary;

pub use client::SkyScrapperClient;
pub use response::{parse_airports_response, parse_flights_response};

/// Free-text airport search.
#[async_trait]
pub trait AirportSearch: Send + Sync {
    /// Return the airports matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be read.
    async fn search_airports(&self, query: &str) -> Result<Vec<AirportOption>>;
}

/// One-way flight search for a single leg.
#[async_trait]
pub trait FlightSearch: Send + Sync {
    /// Return the itineraries for `query`. A response without itineraries
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be read.
    async fn search_flights(&self, query: &FlightQuery) -> Result<Vec<Itinerary>>;
}
