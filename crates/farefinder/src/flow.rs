//! The two-stage flight selection flow.
//!
//! ```text
//! Idle → LoadingOutbound → ShowingOutbound → LoadingReturn → ShowingReturn → Finalized
//!                                 └──────────── one-way ──────────────────────┘
//! ```
//!
//! [`FlightSelectionFlow`] is a plain state machine: it never performs I/O.
//! Transitions that need data hand back a [`FetchRequest`]; whoever runs the
//! request reports back through [`FlightSelectionFlow::complete`] with the
//! request's ticket. Every request gets a fresh generation, and a result
//! whose ticket no longer matches the loading state is dropped, so a fetch
//! superseded by a newer search is simply ignored when it lands.
//!
//! [`FlowSession`] pairs the state machine with a [`FlightSearch`]
//! implementation and runs each request to completion.

use std::mem;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::FlightSearch;
use crate::criteria::{FlightQuery, SearchCriteria};
use crate::error::{Error, Result};
use crate::itinerary::Itinerary;

/// Which leg of the trip a fetch is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegDirection {
    /// Origin to destination.
    Outbound,
    /// Destination back to origin.
    Return,
}

impl std::fmt::Display for LegDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outbound => write!(f, "outbound"),
            Self::Return => write!(f, "return"),
        }
    }
}

/// Identifies the fetch a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    direction: LegDirection,
}

impl FetchTicket {
    /// The leg this fetch is for.
    #[must_use]
    pub fn direction(&self) -> LegDirection {
        self.direction
    }
}

/// A flight search the flow is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Hand this back with the result.
    pub ticket: FetchTicket,
    /// Parameters for the flight search.
    pub query: FlightQuery,
}

/// Why a fetch produced no list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The request failed or the provider refused it.
    Unavailable(String),
    /// The provider answered with data we could not read.
    Malformed(String),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "flights unavailable: {reason}"),
            Self::Malformed(reason) => write!(f, "unreadable flight data: {reason}"),
        }
    }
}

/// Result of a flight fetch as seen by the flow.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The itineraries returned, possibly none.
    Loaded(Vec<Itinerary>),
    /// The fetch failed; the list reads as empty.
    Failed(FetchFailure),
}

impl FetchOutcome {
    /// Classify the result of a [`FlightSearch`] call.
    #[must_use]
    pub fn from_result(result: Result<Vec<Itinerary>>) -> Self {
        match result {
            Ok(itineraries) => Self::Loaded(itineraries),
            Err(e) if e.is_malformed_response() => {
                Self::Failed(FetchFailure::Malformed(e.to_string()))
            }
            Err(e) => Self::Failed(FetchFailure::Unavailable(e.to_string())),
        }
    }

    /// The itineraries to display; empty when the fetch failed.
    #[must_use]
    pub fn itineraries(&self) -> &[Itinerary] {
        match self {
            Self::Loaded(itineraries) => itineraries,
            Self::Failed(_) => &[],
        }
    }

    /// The failure, if the fetch failed.
    #[must_use]
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Loaded(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

/// The itineraries chosen for a finished trip.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TripSelection {
    /// The chosen outbound itinerary.
    pub outbound: Itinerary,
    /// The chosen return itinerary; `None` for one-way trips.
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub inbound: Option<Itinerary>,
}

/// Coarse position in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing searched yet.
    Idle,
    /// Picking the outbound leg.
    Outbound,
    /// Picking the return leg.
    Return,
    /// Read-only summary.
    Finalized,
}

/// Everything the flow knows, shaped by where it is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlowState {
    /// No criteria submitted yet.
    #[default]
    Idle,
    /// Waiting for the outbound fetch.
    LoadingOutbound {
        /// The submitted search.
        criteria: SearchCriteria,
    },
    /// Outbound list on display.
    ShowingOutbound {
        /// The submitted search.
        criteria: SearchCriteria,
        /// The outbound fetch result.
        results: FetchOutcome,
        /// Index of the highlighted itinerary.
        selected: Option<usize>,
    },
    /// Waiting for the return fetch.
    LoadingReturn {
        /// The submitted search.
        criteria: SearchCriteria,
        /// The chosen outbound itinerary.
        outbound: Itinerary,
    },
    /// Return list on display.
    ShowingReturn {
        /// The submitted search.
        criteria: SearchCriteria,
        /// The chosen outbound itinerary.
        outbound: Itinerary,
        /// The return fetch result.
        results: FetchOutcome,
        /// Index of the highlighted itinerary.
        selected: Option<usize>,
    },
    /// Selections confirmed.
    Finalized {
        /// The submitted search.
        criteria: SearchCriteria,
        /// What was chosen.
        trip: TripSelection,
    },
}

impl FlowState {
    /// Short description used in error messages and logs.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Idle => "no search has been submitted",
            Self::LoadingOutbound { .. } => "loading outbound flights",
            Self::ShowingOutbound { .. } => "choosing an outbound flight",
            Self::LoadingReturn { .. } => "loading return flights",
            Self::ShowingReturn { .. } => "choosing a return flight",
            Self::Finalized { .. } => "the trip is finalized",
        }
    }

    /// Coarse phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::LoadingOutbound { .. } | Self::ShowingOutbound { .. } => Phase::Outbound,
            Self::LoadingReturn { .. } | Self::ShowingReturn { .. } => Phase::Return,
            Self::Finalized { .. } => Phase::Finalized,
        }
    }

    /// Whether a fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::LoadingOutbound { .. } | Self::LoadingReturn { .. }
        )
    }

    /// The submitted search, once there is one.
    #[must_use]
    pub fn criteria(&self) -> Option<&SearchCriteria> {
        match self {
            Self::Idle => None,
            Self::LoadingOutbound { criteria }
            | Self::ShowingOutbound { criteria, .. }
            | Self::LoadingReturn { criteria, .. }
            | Self::ShowingReturn { criteria, .. }
            | Self::Finalized { criteria, .. } => Some(criteria),
        }
    }

    /// The list on display, empty outside the two showing states.
    #[must_use]
    pub fn displayed(&self) -> &[Itinerary] {
        match self {
            Self::ShowingOutbound { results, .. } | Self::ShowingReturn { results, .. } => {
                results.itineraries()
            }
            _ => &[],
        }
    }

    /// The highlighted index in the displayed list.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        match self {
            Self::ShowingOutbound { selected, .. } | Self::ShowingReturn { selected, .. } => {
                *selected
            }
            _ => None,
        }
    }

    /// The failure behind the displayed list, if its fetch failed.
    #[must_use]
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::ShowingOutbound { results, .. } | Self::ShowingReturn { results, .. } => {
                results.failure()
            }
            _ => None,
        }
    }
}

/// Outbound/return selection state machine.
#[derive(Debug, Default)]
pub struct FlightSelectionFlow {
    state: FlowState,
    generation: u64,
}

impl FlightSelectionFlow {
    /// A flow with nothing searched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Start over with new criteria.
    ///
    /// Drops any lists and selections, enters `LoadingOutbound` and returns
    /// the outbound fetch to run. Results of earlier fetches will be ignored.
    pub fn set_criteria(&mut self, criteria: SearchCriteria) -> FetchRequest {
        let query = criteria.outbound_query();
        self.state = FlowState::LoadingOutbound { criteria };
        let ticket = self.next_ticket(LegDirection::Outbound);
        debug!(generation = ticket.generation, "loading outbound flights");
        FetchRequest { ticket, query }
    }

    /// Deliver the result of a fetch.
    ///
    /// Returns `false`, leaving the state untouched, when the ticket belongs
    /// to a superseded fetch or to the leg not being loaded.
    pub fn complete(&mut self, ticket: FetchTicket, outcome: FetchOutcome) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "ignoring superseded {} result",
                ticket.direction
            );
            return false;
        }

        let next = match (mem::take(&mut self.state), ticket.direction) {
            (FlowState::LoadingOutbound { criteria }, LegDirection::Outbound) => {
                FlowState::ShowingOutbound {
                    criteria,
                    results: outcome,
                    selected: None,
                }
            }
            (FlowState::LoadingReturn { criteria, outbound }, LegDirection::Return) => {
                FlowState::ShowingReturn {
                    criteria,
                    outbound,
                    results: outcome,
                    selected: None,
                }
            }
            (other, _) => {
                self.state = other;
                return false;
            }
        };
        self.state = next;
        if let Some(failure) = self.state.failure() {
            warn!("{} flight search failed: {failure}", ticket.direction);
        }
        debug!("{}", self.state.describe());
        true
    }

    /// Highlight an outbound itinerary by its position in the list.
    ///
    /// # Errors
    ///
    /// Fails without changing anything unless the outbound list is on
    /// display and `index` is inside it.
    pub fn select_outbound(&mut self, index: usize) -> Result<()> {
        match &mut self.state {
            FlowState::ShowingOutbound {
                results, selected, ..
            } => select(results, selected, index),
            other => Err(invalid("select an outbound flight", other)),
        }
    }

    /// Highlight a return itinerary by its position in the list.
    ///
    /// # Errors
    ///
    /// Fails without changing anything unless the return list is on display
    /// and `index` is inside it.
    pub fn select_return(&mut self, index: usize) -> Result<()> {
        match &mut self.state {
            FlowState::ShowingReturn {
                results, selected, ..
            } => select(results, selected, index),
            other => Err(invalid("select a return flight", other)),
        }
    }

    /// Whether [`advance`](Self::advance) would succeed.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        matches!(
            &self.state,
            FlowState::ShowingOutbound {
                criteria,
                selected: Some(_),
                ..
            } if criteria.is_round_trip()
        )
    }

    /// Move on to the return leg, returning the return fetch to run.
    ///
    /// # Errors
    ///
    /// Fails without changing anything unless an outbound itinerary is
    /// selected and the search has a return date.
    pub fn advance(&mut self) -> Result<FetchRequest> {
        const ACTION: &str = "continue to return flights";

        let FlowState::ShowingOutbound {
            criteria,
            results,
            selected,
        } = &self.state
        else {
            return Err(invalid(ACTION, &self.state));
        };
        let Some(index) = *selected else {
            return Err(Error::InvalidTransition {
                action: ACTION,
                state: "no outbound flight is selected",
            });
        };
        let Some(query) = criteria.return_query() else {
            return Err(Error::InvalidTransition {
                action: ACTION,
                state: "searching one-way",
            });
        };
        let outbound = pick(results, index)?;

        self.state = FlowState::LoadingReturn {
            criteria: criteria.clone(),
            outbound,
        };
        let ticket = self.next_ticket(LegDirection::Return);
        debug!(generation = ticket.generation, "loading return flights");
        Ok(FetchRequest { ticket, query })
    }

    /// Whether [`finalize`](Self::finalize) would succeed.
    #[must_use]
    pub fn can_finalize(&self) -> bool {
        match &self.state {
            FlowState::ShowingReturn { selected, .. } => selected.is_some(),
            FlowState::ShowingOutbound {
                criteria, selected, ..
            } => selected.is_some() && !criteria.is_round_trip(),
            _ => false,
        }
    }

    /// Confirm the selections and enter the read-only summary, returning
    /// what was chosen.
    ///
    /// Round trips need a selected return itinerary; one-way trips can be
    /// finalized straight after choosing the outbound one.
    ///
    /// # Errors
    ///
    /// Fails without changing anything when the required selection is
    /// missing.
    pub fn finalize(&mut self) -> Result<TripSelection> {
        const ACTION: &str = "finalize the trip";

        let (criteria, trip) = match &self.state {
            FlowState::ShowingReturn {
                criteria,
                outbound,
                results,
                selected: Some(index),
            } => (
                criteria.clone(),
                TripSelection {
                    outbound: outbound.clone(),
                    inbound: Some(pick(results, *index)?),
                },
            ),
            FlowState::ShowingOutbound {
                criteria,
                results,
                selected: Some(index),
            } if !criteria.is_round_trip() => (
                criteria.clone(),
                TripSelection {
                    outbound: pick(results, *index)?,
                    inbound: None,
                },
            ),
            FlowState::ShowingReturn { selected: None, .. } => {
                return Err(Error::InvalidTransition {
                    action: ACTION,
                    state: "no return flight is selected",
                })
            }
            FlowState::ShowingOutbound { selected: None, .. } => {
                return Err(Error::InvalidTransition {
                    action: ACTION,
                    state: "no outbound flight is selected",
                })
            }
            other => return Err(invalid(ACTION, other)),
        };

        debug!("trip finalized");
        self.state = FlowState::Finalized {
            criteria,
            trip: trip.clone(),
        };
        Ok(trip)
    }

    fn next_ticket(&mut self, direction: LegDirection) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            direction,
        }
    }
}

fn invalid(action: &'static str, state: &FlowState) -> Error {
    Error::InvalidTransition {
        action,
        state: state.describe(),
    }
}

fn select(results: &FetchOutcome, selected: &mut Option<usize>, index: usize) -> Result<()> {
    let len = results.itineraries().len();
    if index >= len {
        return Err(Error::SelectionOutOfRange { index, len });
    }
    *selected = Some(index);
    Ok(())
}

fn pick(results: &FetchOutcome, index: usize) -> Result<Itinerary> {
    let itineraries = results.itineraries();
    itineraries
        .get(index)
        .cloned()
        .ok_or(Error::SelectionOutOfRange {
            index,
            len: itineraries.len(),
        })
}

/// Runs a [`FlightSelectionFlow`] against a flight search provider.
///
/// Fetches are awaited in place, one at a time.
#[derive(Debug)]
pub struct FlowSession<F: ?Sized> {
    flow: FlightSelectionFlow,
    api: Arc<F>,
}

impl<F> FlowSession<F>
where
    F: FlightSearch + ?Sized,
{
    /// A session with nothing searched.
    pub fn new(api: Arc<F>) -> Self {
        Self {
            flow: FlightSelectionFlow::new(),
            api,
        }
    }

    /// The underlying state machine.
    #[must_use]
    pub fn flow(&self) -> &FlightSelectionFlow {
        &self.flow
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &FlowState {
        self.flow.state()
    }

    /// Search the outbound leg for `criteria`, discarding any previous
    /// search, and wait for the list.
    pub async fn submit(&mut self, criteria: SearchCriteria) -> &FlowState {
        let request = self.flow.set_criteria(criteria);
        self.run(request).await;
        self.flow.state()
    }

    /// Highlight an outbound itinerary.
    ///
    /// # Errors
    ///
    /// See [`FlightSelectionFlow::select_outbound`].
    pub fn select_outbound(&mut self, index: usize) -> Result<()> {
        self.flow.select_outbound(index)
    }

    /// Search the return leg and wait for the list.
    ///
    /// # Errors
    ///
    /// See [`FlightSelectionFlow::advance`]. Fetch failures are not errors;
    /// they show up in the resulting state.
    pub async fn advance(&mut self) -> Result<&FlowState> {
        let request = self.flow.advance()?;
        self.run(request).await;
        Ok(self.flow.state())
    }

    /// Highlight a return itinerary.
    ///
    /// # Errors
    ///
    /// See [`FlightSelectionFlow::select_return`].
    pub fn select_return(&mut self, index: usize) -> Result<()> {
        self.flow.select_return(index)
    }

    /// Confirm the selections.
    ///
    /// # Errors
    ///
    /// See [`FlightSelectionFlow::finalize`].
    pub fn finalize(&mut self) -> Result<TripSelection> {
        self.flow.finalize()
    }

    async fn run(&mut self, request: FetchRequest) {
        let outcome = FetchOutcome::from_result(self.api.search_flights(&request.query).await);
        self.flow.complete(request.ticket, outcome);
    }
}
