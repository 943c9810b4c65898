//! Date by time-of-day table of closing prices.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// Closing prices keyed by calendar date, then by time of day.
///
/// Only slots that had a bar are present; a missing bar is a missing key,
/// never a zero. Both levels iterate in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceMatrix {
    rows: BTreeMap<NaiveDate, BTreeMap<NaiveTime, f64>>,
}

impl PriceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a close and returns the one it replaced, if any.
    pub fn insert(&mut self, date: NaiveDate, time: NaiveTime, close: f64) -> Option<f64> {
        self.rows.entry(date).or_default().insert(time, close)
    }

    pub fn get(&self, date: NaiveDate, time: NaiveTime) -> Option<f64> {
        self.rows.get(&date)?.get(&time).copied()
    }

    pub fn row(&self, date: NaiveDate) -> Option<&BTreeMap<NaiveTime, f64>> {
        self.rows.get(&date)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&NaiveDate, &BTreeMap<NaiveTime, f64>)> {
        self.rows.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    /// Union of the times seen on any date, ascending. These are the columns
    /// of the rendered table.
    pub fn times(&self) -> BTreeSet<NaiveTime> {
        self.rows.values().flat_map(|r| r.keys().copied()).collect()
    }

    /// Number of dates.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn columns_are_the_union_of_times() {
        let mut m = PriceMatrix::new();
        m.insert(d(2), t(9, 30), 1.0);
        m.insert(d(3), t(9, 45), 2.0);
        m.insert(d(3), t(9, 30), 3.0);

        assert_eq!(m.times().into_iter().collect::<Vec<_>>(), vec![t(9, 30), t(9, 45)]);
        assert_eq!(m.row_count(), 2);
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(d(2), t(9, 45)), None);
        assert_eq!(m.dates().collect::<Vec<_>>(), vec![d(2), d(3)]);
    }

    #[test]
    fn insert_reports_the_replaced_close() {
        let mut m = PriceMatrix::new();
        assert_eq!(m.insert(d(2), t(9, 30), 1.0), None);
        assert_eq!(m.insert(d(2), t(9, 30), 1.5), Some(1.0));
        assert_eq!(m.get(d(2), t(9, 30)), Some(1.5));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn serializes_as_nested_object() {
        let mut m = PriceMatrix::new();
        m.insert(d(2), t(9, 30), 185.0);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"2024-01-02":{"09:30:00":185.0}}"#);
    }
}
