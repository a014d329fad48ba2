//! Per-timestamp sensor records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Bound, RangeBounds};

use crate::{Real, SensorId};

/// Capture time, in the dataset's own integer time unit.
pub type Timestamp = u64;

/// Key of a record, a pose or a rig pose: `(timestamp, sensor id)`.
///
/// Ordering is by timestamp first, which keeps range queries cheap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub timestamp: Timestamp,
    pub sensor_id: SensorId,
}

impl RecordKey {
    pub fn new(timestamp: Timestamp, sensor_id: impl Into<SensorId>) -> Self {
        Self {
            timestamp,
            sensor_id: sensor_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.timestamp, self.sensor_id)
    }
}

/// One GNSS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GnssRecord {
    pub x: Real,
    pub y: Real,
    pub z: Real,
    /// Receiver UTC time, 0 if unknown.
    pub utc: u64,
    /// Dilution of precision, 0 if unknown.
    pub dop: Real,
}

/// Records of one kind, keyed by `(timestamp, sensor id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Records<T> {
    entries: BTreeMap<RecordKey, T>,
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Records<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.entries.contains_key(key)
    }

    /// All records, ordered by timestamp then sensor id.
    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &T)> {
        self.entries.iter()
    }

    /// Records of a single sensor.
    pub fn for_sensor<'a>(
        &'a self,
        sensor_id: &'a str,
    ) -> impl Iterator<Item = (&'a RecordKey, &'a T)> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.sensor_id == sensor_id)
    }

    /// Records whose timestamp falls into `range`.
    pub fn in_range<R>(&self, range: R) -> impl Iterator<Item = (&RecordKey, &T)>
    where
        R: RangeBounds<Timestamp>,
    {
        let first = match range.start_bound() {
            Bound::Included(&t) => Some(t),
            Bound::Excluded(&t) => t.checked_add(1),
            Bound::Unbounded => Some(0),
        };
        let end = range.end_bound().cloned();
        // "" sorts before every sensor id, so this is the lowest key at `t`.
        first
            .into_iter()
            .flat_map(move |t| self.entries.range(RecordKey::new(t, "")..))
            .take_while(move |(key, _)| match end {
                Bound::Included(last) => key.timestamp <= last,
                Bound::Excluded(last) => key.timestamp < last,
                Bound::Unbounded => true,
            })
    }

    /// Timestamps present in these records, ascending and without repeats.
    pub fn timestamps(&self) -> Vec<Timestamp> {
        let mut out: Vec<Timestamp> = self.entries.keys().map(|k| k.timestamp).collect();
        out.dedup();
        out
    }

    pub(crate) fn insert_unchecked(&mut self, key: RecordKey, value: T) {
        self.entries.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Records<String> {
        let mut records = Records::default();
        for (ts, sensor) in [(0, "cam0"), (0, "cam1"), (5, "cam0"), (9, "cam1")] {
            records.insert_unchecked(RecordKey::new(ts, sensor), format!("{sensor}/{ts}.jpg"));
        }
        records
    }

    #[test]
    fn filter_by_sensor() {
        let records = sample();
        let names: Vec<_> = records.for_sensor("cam0").map(|(_, v)| v.as_str()).collect();
        assert_eq!(names, ["cam0/0.jpg", "cam0/5.jpg"]);
    }

    #[test]
    fn filter_by_range() {
        let records = sample();
        assert_eq!(records.in_range(0..5).count(), 2);
        assert_eq!(records.in_range(0..=5).count(), 3);
        assert_eq!(records.in_range(6..).count(), 1);
        assert_eq!(records.in_range(..).count(), 4);
        assert_eq!(records.timestamps(), vec![0, 5, 9]);
    }

    #[test]
    fn range_with_excluded_start() {
        let records = sample();
        let n = records
            .in_range((Bound::Excluded(0), Bound::Included(9)))
            .count();
        assert_eq!(n, 2);
    }
}
