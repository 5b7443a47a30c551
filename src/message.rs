//! Turn the filtered events into the text of the notification.
//!

use terremoto_common::TimeWindow;
use terremoto_formats::SeismicEvent;

use crate::HomeLocation;

/// At most that many events are listed, the rest is summarized in one line
pub const MAX_LISTED: usize = 10;

/// Placeholder for an event without region name
pub const UNKNOWN_PLACE: &str = "Unknown location";

/// Build the digest.
///
/// `events` are already filtered (and carry their distance), `total` is the number of events
/// the feed returned before filtering.
///
pub fn format_message(
    events: &[SeismicEvent],
    total: usize,
    home: &HomeLocation,
    window: &TimeWindow,
) -> String {
    if events.is_empty() {
        return format!(
            "🌍 No earthquakes detected in your area in the {}.\n\
             📊 Total earthquakes found worldwide: {}",
            window.label().to_lowercase(),
            total
        );
    }

    let mut msg = format!(
        "⏰ {}\n📍 Location: {:.4}, {:.4}\n📏 Radius: {:.1}km\n\
         📊 Found {} earthquake(s) in your area (out of {} total worldwide):\n\n",
        window.label(),
        home.location.lat,
        home.location.lon,
        home.radius_km,
        events.len(),
        total
    );

    events
        .iter()
        .take(MAX_LISTED)
        .enumerate()
        .for_each(|(i, ev)| msg.push_str(&format_event(i + 1, ev)));

    if events.len() > MAX_LISTED {
        msg.push_str(&format!(
            "... and {} more earthquakes",
            events.len() - MAX_LISTED
        ));
    }
    msg
}

fn format_event(n: usize, ev: &SeismicEvent) -> String {
    let place = if ev.place.is_empty() {
        UNKNOWN_PLACE
    } else {
        ev.place.as_str()
    };
    let distance = match ev.distance_km {
        Some(d) => format!("{:.1}km", d),
        None => "n/a".to_string(),
    };
    format!(
        "{}. Magnitude {:.1} - {}\n   📅 {}\n   📍 Distance: {}\n\n",
        n, ev.magnitude, place, ev.time, distance
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use terremoto_formats::EventTime;

    use super::*;

    fn home() -> HomeLocation {
        HomeLocation::new(40.7128, -74.006, 500.).unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::last(24, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()).unwrap()
    }

    fn event(n: usize) -> SeismicEvent {
        SeismicEvent {
            magnitude: 2. + n as f64 / 10.,
            place: format!("PLACE {n}"),
            time: EventTime::Known(Utc.with_ymd_and_hms(2024, 3, 1, 2, 30, 0).unwrap()),
            distance_km: Some(10. * n as f64),
            ..SeismicEvent::default()
        }
    }

    #[test]
    fn test_message_empty() {
        let msg = format_message(&[], 42, &home(), &window());
        assert_eq!(
            "🌍 No earthquakes detected in your area in the last 24 hours.\n\
             📊 Total earthquakes found worldwide: 42",
            msg
        );
        assert!(!msg.contains("1. "));
    }

    #[test]
    fn test_message_header_and_entry() {
        let mut ev = event(1);
        ev.magnitude = 4.567;
        ev.distance_km = Some(12.345);

        let msg = format_message(&[ev], 57, &home(), &window());
        let expected = "⏰ Last 24 Hours
📍 Location: 40.7128, -74.0060
📏 Radius: 500.0km
📊 Found 1 earthquake(s) in your area (out of 57 total worldwide):

1. Magnitude 4.6 - PLACE 1
   📅 2024-03-01 02:30 UTC
   📍 Distance: 12.3km

";
        assert_eq!(expected, msg);
    }

    #[test]
    fn test_message_truncated() {
        let events: Vec<_> = (1..=12).map(event).collect();
        let msg = format_message(&events, 100, &home(), &window());

        assert!(msg.contains("Found 12 earthquake(s)"));
        assert!(msg.contains("\n10. Magnitude 3.0 - PLACE 10\n"));
        assert!(!msg.contains("11. "));
        assert!(!msg.contains("PLACE 11"));
        assert!(msg.ends_with("... and 2 more earthquakes"));
    }

    #[test]
    fn test_message_exactly_max() {
        let events: Vec<_> = (1..=MAX_LISTED).map(event).collect();
        let msg = format_message(&events, 10, &home(), &window());

        assert!(msg.contains("10. "));
        assert!(!msg.contains("more earthquakes"));
    }

    #[test]
    fn test_message_unknown_time_and_place() {
        let ev = SeismicEvent {
            magnitude: 1.,
            distance_km: Some(1.),
            ..SeismicEvent::default()
        };
        let msg = format_message(&[ev], 1, &home(), &window());

        assert!(msg.contains("1. Magnitude 1.0 - Unknown location\n"));
        assert!(msg.contains("📅 unknown time\n"));
    }
}
