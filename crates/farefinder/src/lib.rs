//! `farefinder` - Search flights between two airports and pick an itinerary
//!
//! This library provides the pieces behind the `farefind` front end: airport
//! autocomplete with debounced lookups, the search form and its date rules,
//! the outbound/return selection state machine, and a client for the
//! RapidAPI-hosted flight data provider.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod airport;
pub mod api;
pub mod cli;
pub mod config;
pub mod criteria;
pub mod error;
pub mod flow;
pub mod form;
pub mod itinerary;
pub mod logging;
pub mod lookup;
pub mod render;

pub use airport::{AirportOption, AirportToken};
pub use api::{AirportSearch, FlightSearch, SkyScrapperClient};
pub use config::Config;
pub use criteria::{FlightQuery, SearchCriteria};
pub use error::{Error, Result};
pub use flow::{FlightSelectionFlow, FlowSession, FlowState, TripSelection};
pub use form::SearchForm;
pub use itinerary::Itinerary;
pub use logging::init_logging;
pub use lookup::AirportLookup;
