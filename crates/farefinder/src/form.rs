//! The search form: airport pickers, dates, passengers and submission.
//!
//! Date rules:
//! - departure starts as today and may not be set before today;
//! - every new departure date resets the return date to the next day;
//! - the return date may not precede the departure date;
//! - clearing the return date makes the search one-way.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::airport::{AirportOption, AirportToken};
use crate::api::AirportSearch;
use crate::criteria::{SearchCriteria, DATE_FORMAT};
use crate::error::{Error, Result};
use crate::lookup::AirportLookup;

/// Default passenger count.
pub const DEFAULT_PASSENGERS: u8 = 1;

/// One airport picker: what has been typed, what it found, what was picked.
#[derive(Debug, Default)]
pub struct AirportField {
    query: String,
    lookup: Option<AirportLookup>,
    selected: Option<AirportOption>,
}

impl AirportField {
    /// Text currently typed in the field.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Options found for the typed text. Empty without an attached lookup.
    #[must_use]
    pub fn options(&self) -> Vec<AirportOption> {
        self.lookup
            .as_ref()
            .map(AirportLookup::options)
            .unwrap_or_default()
    }

    /// The picked airport.
    #[must_use]
    pub fn selected(&self) -> Option<&AirportOption> {
        self.selected.as_ref()
    }

    /// The lookup feeding this field, if one is attached.
    #[must_use]
    pub fn lookup(&self) -> Option<&AirportLookup> {
        self.lookup.as_ref()
    }

    fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        if let Some(lookup) = &self.lookup {
            lookup.set_query(query);
        }
    }

    fn enter(&mut self, input: &str) -> bool {
        match input.parse::<AirportToken>() {
            Ok(token) => {
                self.query = input.to_string();
                self.selected = Some(AirportOption::from_token(token));
                true
            }
            Err(_) => {
                self.set_query(input);
                false
            }
        }
    }
}

/// Editable search form state.
#[derive(Debug)]
pub struct SearchForm {
    origin: AirportField,
    destination: AirportField,
    departure_date: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
    passenger_count: u8,
    max_passengers: u8,
    today: NaiveDate,
    submitted: Option<SearchCriteria>,
}

impl SearchForm {
    /// A blank form as of `today`: departing today, returning tomorrow,
    /// one passenger.
    #[must_use]
    pub fn new(today: NaiveDate, max_passengers: u8) -> Self {
        Self {
            origin: AirportField::default(),
            destination: AirportField::default(),
            departure_date: Some(today),
            return_date: next_day(today),
            passenger_count: DEFAULT_PASSENGERS,
            max_passengers: max_passengers.max(1),
            today,
            submitted: None,
        }
    }

    /// Attach an independent debounced lookup to each airport field.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_lookups<A>(mut self, api: Arc<A>, debounce: Duration) -> Self
    where
        A: AirportSearch + ?Sized + 'static,
    {
        self.origin.lookup = Some(AirportLookup::spawn(Arc::clone(&api), debounce));
        self.destination.lookup = Some(AirportLookup::spawn(api, debounce));
        self
    }

    /// The origin picker.
    #[must_use]
    pub fn origin(&self) -> &AirportField {
        &self.origin
    }

    /// The destination picker.
    #[must_use]
    pub fn destination(&self) -> &AirportField {
        &self.destination
    }

    /// Update the origin search text.
    pub fn set_origin_query(&mut self, query: &str) {
        self.origin.set_query(query);
    }

    /// Update the destination search text.
    pub fn set_destination_query(&mut self, query: &str) {
        self.destination.set_query(query);
    }

    /// Take origin input that is either a token or search text.
    ///
    /// A token picks the airport directly without a lookup; returns whether
    /// it did. Anything else becomes the search text.
    pub fn enter_origin(&mut self, input: &str) -> bool {
        self.origin.enter(input)
    }

    /// Take destination input that is either a token or search text.
    ///
    /// See [`enter_origin`](Self::enter_origin).
    pub fn enter_destination(&mut self, input: &str) -> bool {
        self.destination.enter(input)
    }

    /// Pick (or clear) the origin airport.
    pub fn select_origin(&mut self, option: Option<AirportOption>) {
        self.origin.selected = option;
    }

    /// Pick (or clear) the destination airport.
    pub fn select_destination(&mut self, option: Option<AirportOption>) {
        self.destination.selected = option;
    }

    /// Departure date.
    #[must_use]
    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.departure_date
    }

    /// Return date; `None` means one-way.
    #[must_use]
    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    /// Passenger count.
    #[must_use]
    pub fn passenger_count(&self) -> u8 {
        self.passenger_count
    }

    /// Set or clear the departure date. A new date also moves the return
    /// date to the following day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `date` is before today.
    pub fn set_departure_date(&mut self, date: Option<NaiveDate>) -> Result<()> {
        if let Some(date) = date {
            if date < self.today {
                return Err(Error::validation(format!(
                    "Departure date {} is in the past.",
                    date.format(DATE_FORMAT)
                )));
            }
            self.return_date = next_day(date);
        }
        self.departure_date = date;
        Ok(())
    }

    /// Set or clear the return date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `date` precedes the departure date
    /// (or today, when no departure date is set).
    pub fn set_return_date(&mut self, date: Option<NaiveDate>) -> Result<()> {
        if let Some(date) = date {
            let earliest = self.departure_date.unwrap_or(self.today);
            if date < earliest {
                return Err(Error::validation(format!(
                    "Return date {} is before {}.",
                    date.format(DATE_FORMAT),
                    earliest.format(DATE_FORMAT)
                )));
            }
        }
        self.return_date = date;
        Ok(())
    }

    /// Set the passenger count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless `count` is between 1 and the
    /// configured maximum.
    pub fn set_passenger_count(&mut self, count: u8) -> Result<()> {
        if count == 0 || count > self.max_passengers {
            return Err(Error::validation(format!(
                "Number of passengers must be between 1 and {}.",
                self.max_passengers
            )));
        }
        self.passenger_count = count;
        Ok(())
    }

    /// Freeze the form into search criteria.
    ///
    /// The returned snapshot is independent of later edits. The most recent
    /// one is also kept as [`SearchForm::submitted`].
    ///
    /// # Errors
    ///
    /// Returns the "Please fill in all required fields." validation error,
    /// leaving the form untouched, when the origin, destination or departure
    /// date is missing.
    pub fn submit(&mut self) -> Result<SearchCriteria> {
        let (Some(origin), Some(destination), Some(departure)) = (
            self.origin.selected.as_ref(),
            self.destination.selected.as_ref(),
            self.departure_date,
        ) else {
            return Err(Error::missing_fields());
        };

        let criteria = SearchCriteria::new(
            origin.token.clone(),
            destination.token.clone(),
            departure,
            self.return_date,
            self.passenger_count,
        );
        debug!(
            origin = %criteria.origin(),
            destination = %criteria.destination(),
            departure = %criteria.departure_date(),
            "search submitted"
        );
        self.submitted = Some(criteria.clone());
        Ok(criteria)
    }

    /// The last submitted criteria, if the form has been submitted.
    #[must_use]
    pub fn submitted(&self) -> Option<&SearchCriteria> {
        self.submitted.as_ref()
    }
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}
