use std::collections::BTreeMap;

use crate::error::RangeError;
use crate::models::{Record, Series, SeriesPoint};

/// Inclusive year window for a query. Construction rejects inverted bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

/// Collapse raw records into per-name series over the range: counts are summed
/// across sex and department per year, absent years zero-filled. Only names
/// with at least one record in range appear. The BTreeMap iteration order is
/// the natural name ordering downstream consumers rely on.
pub fn aggregate(records: &[Record], range: YearRange) -> BTreeMap<String, Series> {
    let mut totals: BTreeMap<String, BTreeMap<i32, u64>> = BTreeMap::new();

    for record in records {
        if !range.contains(record.year) {
            continue;
        }
        *totals
            .entry(record.name.clone())
            .or_default()
            .entry(record.year)
            .or_insert(0) += record.count;
    }

    totals
        .into_iter()
        .map(|(name, by_year)| (name, fill_series(&by_year, range)))
        .collect()
}

/// Single-name variant of [`aggregate`]: always yields a series covering
/// exactly the range, all-zero when the name has no records in it.
pub fn series_for(records: &[Record], range: YearRange, name: &str) -> Series {
    let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();

    for record in records {
        if record.name == name && range.contains(record.year) {
            *by_year.entry(record.year).or_insert(0) += record.count;
        }
    }

    fill_series(&by_year, range)
}

fn fill_series(by_year: &BTreeMap<i32, u64>, range: YearRange) -> Series {
    let points = range
        .years()
        .map(|year| SeriesPoint {
            year,
            count: by_year.get(&year).copied().unwrap_or(0),
        })
        .collect();
    Series { points }
}
