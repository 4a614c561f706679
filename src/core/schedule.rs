//! Upcoming-event view over a fetched event list.

use crate::domain::model::Event;
use chrono::NaiveDateTime;

/// Events dated on or after `now`'s calendar day, earliest first.
///
/// Events without a usable instant are dropped. The sort is stable, so
/// events sharing an instant keep their input order.
pub fn compute_upcoming_events(events: &[Event], now: NaiveDateTime) -> Vec<Event> {
    let today = now.date();

    let mut upcoming: Vec<(NaiveDateTime, &Event)> = events
        .iter()
        .filter_map(|event| {
            let instant = event.instant();
            if instant.is_none() {
                tracing::debug!("Skipping event '{}' with malformed date/time", event.id);
            }
            instant.map(|instant| (instant, event))
        })
        .filter(|(instant, _)| instant.date() >= today)
        .collect();

    upcoming.sort_by_key(|(instant, _)| *instant);
    upcoming.into_iter().map(|(_, event)| event.clone()).collect()
}

/// Number of events strictly after `now`. Malformed events never count.
pub fn count_events_after(events: &[Event], now: NaiveDateTime) -> usize {
    events
        .iter()
        .filter_map(Event::instant)
        .filter(|instant| *instant > now)
        .count()
}
