//! Plain-text rendering of itineraries, result lists and the trip summary.

use std::fmt::Write as _;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::flow::{FetchFailure, FlowState, TripSelection};
use crate::itinerary::Itinerary;

/// Shown when a list has no itineraries.
pub const NO_FLIGHTS: &str = "No flights found";

/// Shown for a missing timestamp.
pub const NOT_AVAILABLE: &str = "N/A";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Render a provider timestamp in the local time zone.
///
/// Timestamps without an offset are taken to be local already. Anything that
/// does not parse is shown as given.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

fn format_timestamp_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string();
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map_or_else(
            || raw.to_string(),
            |naive| naive.format(DISPLAY_FORMAT).to_string(),
        )
}

/// One itinerary as a numbered card. `number` is 1-based.
#[must_use]
pub fn itinerary_card(number: usize, itinerary: &Itinerary, selected: bool) -> String {
    let marker = if selected { '*' } else { ' ' };
    let mut out = String::new();

    let Some(leg) = itinerary.first_leg() else {
        let _ = writeln!(out, "{marker}[{number}] (no flight details)");
        let _ = writeln!(out, "     Price: {}", itinerary.price.formatted);
        return out;
    };

    let _ = writeln!(out, "{marker}[{number}] {}", leg.route());
    let _ = writeln!(out, "     Departure: {}", format_timestamp(&leg.departure));
    let _ = writeln!(out, "     Arrival: {}", format_timestamp(&leg.arrival));
    let _ = writeln!(out, "     Duration: {} minutes", leg.duration_in_minutes);
    let _ = writeln!(out, "     Stops: {}", leg.stop_count);
    let _ = writeln!(out, "     Price: {}", itinerary.price.formatted);
    if let Some(carrier) = leg.first_carrier() {
        let _ = writeln!(
            out,
            "     Airline: {} ({})",
            carrier.name, carrier.alternate_id
        );
    }
    out
}

/// The list currently on display, or why there is nothing to show.
#[must_use]
pub fn result_list(state: &FlowState) -> String {
    let mut out = String::new();
    match state {
        FlowState::Idle => return out,
        FlowState::LoadingOutbound { .. } | FlowState::LoadingReturn { .. } => {
            return "Loading flights...\n".to_string();
        }
        FlowState::Finalized { trip, .. } => return trip_summary(trip),
        FlowState::ShowingOutbound { .. } => out.push_str("Departure flights\n\n"),
        FlowState::ShowingReturn { outbound, .. } => {
            if let Some(leg) = outbound.first_leg() {
                let _ = writeln!(out, "Outbound: {} {}", leg.route(), outbound.price.formatted);
            }
            out.push_str("Return flights\n\n");
        }
    }

    if let Some(FetchFailure::Malformed(reason)) = state.failure() {
        let _ = writeln!(out, "The flight provider sent data we could not read ({reason}).");
    }

    let itineraries = state.displayed();
    if itineraries.is_empty() {
        let _ = writeln!(out, "{NO_FLIGHTS}");
        return out;
    }
    let selected = state.selected_index();
    for (i, itinerary) in itineraries.iter().enumerate() {
        out.push_str(&itinerary_card(i + 1, itinerary, selected == Some(i)));
        out.push('\n');
    }
    out
}

/// The read-only "Selected Flights" summary.
#[must_use]
pub fn trip_summary(trip: &TripSelection) -> String {
    let mut out = String::from("Selected Flights\n\n");
    out.push_str("Departure Flight:\n");
    summary_leg(&mut out, &trip.outbound);
    if let Some(inbound) = &trip.inbound {
        out.push_str("\nReturn Flight:\n");
        summary_leg(&mut out, inbound);
    }
    out
}

fn summary_leg(out: &mut String, itinerary: &Itinerary) {
    match itinerary.first_leg() {
        Some(leg) => {
            let _ = writeln!(out, "  {}", leg.route());
            let _ = writeln!(out, "  {}", format_timestamp(&leg.departure));
        }
        None => {
            let _ = writeln!(out, "  {NOT_AVAILABLE}");
        }
    }
    let _ = writeln!(out, "  {}", itinerary.price.formatted);
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, Utc};

    use super::*;
    use crate::criteria::SearchCriteria;
    use crate::flow::FetchOutcome;
    use crate::itinerary::fixtures::itinerary;

    fn criteria() -> SearchCriteria {
        SearchCriteria::new(
            "95565050, LOND".parse().unwrap(),
            "95673372, NYCA".parse().unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            None,
            1,
        )
    }

    #[test]
    fn test_naive_timestamp_is_already_local() {
        assert_eq!(
            format_timestamp_in("2024-06-01T10:25:00", &Utc),
            "2024-06-01 10:25"
        );
        assert_eq!(
            format_timestamp_in("2024-06-01T10:25", &Utc),
            "2024-06-01 10:25"
        );
    }

    #[test]
    fn test_offset_timestamp_converts_to_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_timestamp_in("2024-06-01T10:25:00Z", &plus_two),
            "2024-06-01 12:25"
        );
    }

    #[test]
    fn test_unparseable_timestamp_shown_verbatim() {
        assert_eq!(format_timestamp_in("tomorrow-ish", &Utc), "tomorrow-ish");
        assert_eq!(format_timestamp_in("  ", &Utc), NOT_AVAILABLE);
    }

    #[test]
    fn test_card_contents() {
        let heathrow = itinerary("LHR", "JFK", "2024-06-01T08:00:00", "$410");
        let card = itinerary_card(2, &heathrow, true);

        assert!(card.starts_with("*[2] LHR → JFK\n"));
        assert!(card.contains("Departure: 2024-06-01 08:00"));
        assert!(card.contains("Duration: 420 minutes"));
        assert!(card.contains("Stops: 0"));
        assert!(card.contains("Price: $410"));
        assert!(card.contains("Airline: British Airways (BA)"));
    }

    #[test]
    fn test_loading_list() {
        let state = FlowState::LoadingOutbound {
            criteria: criteria(),
        };
        assert_eq!(result_list(&state), "Loading flights...\n");
    }

    #[test]
    fn test_empty_list_message() {
        let state = FlowState::ShowingOutbound {
            criteria: criteria(),
            results: FetchOutcome::Loaded(Vec::new()),
            selected: None,
        };
        let text = result_list(&state);
        assert!(text.contains(NO_FLIGHTS));
        assert!(!text.contains("could not read"));
    }

    #[test]
    fn test_malformed_list_has_notice() {
        let state = FlowState::ShowingOutbound {
            criteria: criteria(),
            results: FetchOutcome::Failed(FetchFailure::Malformed("no legs".to_string())),
            selected: None,
        };
        let text = result_list(&state);
        assert!(text.contains("could not read (no legs)"));
        assert!(text.contains(NO_FLIGHTS));
    }

    #[test]
    fn test_list_marks_selection() {
        let state = FlowState::ShowingOutbound {
            criteria: criteria(),
            results: FetchOutcome::Loaded(vec![
                itinerary("LHR", "JFK", "2024-06-01T08:00:00", "$410"),
                itinerary("LGW", "EWR", "2024-06-01T12:30:00", "$388"),
            ]),
            selected: Some(1),
        };
        let text = result_list(&state);
        assert!(text.contains(" [1] LHR → JFK"));
        assert!(text.contains("*[2] LGW → EWR"));
    }

    #[test]
    fn test_round_trip_summary() {
        let trip = TripSelection {
            outbound: itinerary("LHR", "JFK", "2024-06-01T08:00:00", "$410"),
            inbound: Some(itinerary("JFK", "LHR", "2024-06-08T19:00:00", "$1,234")),
        };
        let text = trip_summary(&trip);

        assert!(text.starts_with("Selected Flights\n"));
        assert!(text.contains("Departure Flight:\n  LHR → JFK\n  2024-06-01 08:00\n  $410\n"));
        assert!(text.contains("Return Flight:\n  JFK → LHR\n  2024-06-08 19:00\n  $1,234\n"));
    }

    #[test]
    fn test_one_way_summary_has_no_return() {
        let trip = TripSelection {
            outbound: itinerary("LHR", "JFK", "2024-06-01T08:00:00", "$410"),
            inbound: None,
        };
        assert!(!trip_summary(&trip).contains("Return Flight"));
    }
}
