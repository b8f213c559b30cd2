//! Calendar alignment across instruments.
//!
//! Builds the union of all bar timestamps and forward-fills each series onto
//! it, so every instrument has exactly one bar per calendar step.

use std::collections::BTreeSet;

use replay_core::{Bar, Error, Result, Timestamp};

/// Align several bar series onto a shared calendar.
///
/// Each series is sorted by timestamp (later duplicates win). The calendar is
/// the union of all timestamps, starting at the first timestamp where every
/// instrument has at least one bar. Steps where an instrument has no bar of
/// its own carry its previous bar forward, restamped to the calendar step.
///
/// Returns the calendar and the aligned series in input order.
pub fn align_series(series: Vec<(String, Vec<Bar>)>) -> Result<(Vec<Timestamp>, Vec<(String, Vec<Bar>)>)> {
    if series.is_empty() {
        return Err(Error::config("no instruments to align"));
    }

    let mut sorted = Vec::with_capacity(series.len());
    for (symbol, mut bars) in series {
        if bars.is_empty() {
            return Err(Error::data(format!("no bars for {symbol}")));
        }
        bars.sort_by_key(|b| b.ts);
        // Keep the last bar for each timestamp
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.ts == bar.ts => *prev = bar,
                _ => deduped.push(bar),
            }
        }
        sorted.push((symbol, deduped));
    }

    // Every series is non-empty here
    let start = sorted
        .iter()
        .map(|(_, bars)| bars[0].ts)
        .max()
        .ok_or_else(|| Error::data("empty calendar"))?;

    let calendar: Vec<Timestamp> = sorted
        .iter()
        .flat_map(|(_, bars)| bars.iter().map(|b| b.ts))
        .filter(|ts| *ts >= start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let aligned = sorted
        .into_iter()
        .map(|(symbol, bars)| {
            let filled = forward_fill(&bars, &calendar);
            (symbol, filled)
        })
        .collect();

    Ok((calendar, aligned))
}

/// Project `bars` onto `calendar`, carrying the last seen bar forward.
///
/// `bars` must be sorted and have a bar at or before `calendar[0]`.
fn forward_fill(bars: &[Bar], calendar: &[Timestamp]) -> Vec<Bar> {
    let mut out = Vec::with_capacity(calendar.len());
    let mut next = 0;
    let mut last: Option<&Bar> = None;

    for &ts in calendar {
        while next < bars.len() && bars[next].ts <= ts {
            last = Some(&bars[next]);
            next += 1;
        }
        if let Some(bar) = last {
            let mut bar = bar.clone();
            bar.ts = ts;
            out.push(bar);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn make_bar(d: u32, close: f64) -> Bar {
        Bar {
            ts: day(d),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
            adj_close: close,
        }
    }

    #[test]
    fn test_forward_fill_gap() {
        let series = vec![
            ("A".to_string(), vec![make_bar(2, 10.0), make_bar(3, 11.0), make_bar(4, 12.0)]),
            ("B".to_string(), vec![make_bar(2, 50.0), make_bar(4, 52.0)]),
        ];

        let (calendar, aligned) = align_series(series).unwrap();

        assert_eq!(calendar, vec![day(2), day(3), day(4)]);
        let b = &aligned[1].1;
        assert_eq!(b.len(), 3);
        // Day 3 carries day 2 forward
        assert_eq!(b[1].ts, day(3));
        assert_eq!(b[1].close, 50.0);
        assert_eq!(b[2].close, 52.0);
    }

    #[test]
    fn test_calendar_starts_when_all_have_data() {
        let series = vec![
            ("A".to_string(), vec![make_bar(1, 10.0), make_bar(2, 11.0), make_bar(3, 12.0)]),
            ("B".to_string(), vec![make_bar(2, 50.0), make_bar(3, 51.0)]),
        ];

        let (calendar, aligned) = align_series(series).unwrap();

        assert_eq!(calendar.first(), Some(&day(2)));
        assert_eq!(aligned[0].1[0].close, 11.0);
        assert_eq!(aligned[0].1.len(), aligned[1].1.len());
    }

    #[test]
    fn test_unsorted_and_duplicate_input() {
        let series = vec![(
            "A".to_string(),
            vec![make_bar(3, 12.0), make_bar(2, 10.0), make_bar(2, 10.5)],
        )];

        let (calendar, aligned) = align_series(series).unwrap();

        assert_eq!(calendar.len(), 2);
        assert_eq!(aligned[0].1[0].close, 10.5);
    }

    #[test]
    fn test_empty_series_rejected() {
        let series = vec![("A".to_string(), Vec::new())];
        assert!(matches!(align_series(series), Err(Error::Data(_))));
        assert!(matches!(align_series(Vec::new()), Err(Error::Config(_))));
    }
}
