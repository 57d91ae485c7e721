use std::collections::BTreeMap;

use crate::error::RangeError;
use crate::models::{PopularityProfile, Series, SurgeEvent};

/// Inclusive bounds applied to a series' maximum before peak detection runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdBand {
    min: u64,
    max: u64,
}

impl ThresholdBand {
    pub fn new(min: u64, max: u64) -> Result<Self, RangeError> {
        if min > max {
            return Err(RangeError::InvalidThresholdBand { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn contains(&self, value: u64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Scan every series for surge years. A name is surfaced when its series
/// maximum lies inside the band and at least one interior local maximum
/// reaches the band's lower bound. Names keep the aggregation's iteration
/// order; events ascend by year. Empty input yields an empty list.
pub fn detect(trends: &BTreeMap<String, Series>, band: ThresholdBand) -> Vec<PopularityProfile> {
    let mut profiles = Vec::new();

    for (name, series) in trends {
        if !band.contains(series.max_count()) {
            continue;
        }

        let events = local_maxima(series, band.min());
        if events.is_empty() {
            continue;
        }

        profiles.push(PopularityProfile {
            name: name.clone(),
            events,
            series: series.clone(),
        });
    }

    profiles
}

/// Interior points strictly above both neighbors and at least `min_height`
/// tall. Endpoints never qualify, and plateaus of equal adjacent values
/// produce no peak at the tie (strict comparison on both sides). No
/// prominence or distance constraint is applied.
fn local_maxima(series: &Series, min_height: u64) -> Vec<SurgeEvent> {
    let points = &series.points;
    let mut events = Vec::new();

    for i in 1..points.len().saturating_sub(1) {
        let here = points[i].count;
        if here > points[i - 1].count && here > points[i + 1].count && here >= min_height {
            events.push(SurgeEvent {
                year: points[i].year,
                count: here,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesPoint;

    fn series(start_year: i32, counts: &[u64]) -> Series {
        Series {
            points: counts
                .iter()
                .enumerate()
                .map(|(i, &count)| SeriesPoint {
                    year: start_year + i as i32,
                    count,
                })
                .collect(),
        }
    }

    fn trends_of(name: &str, series: Series) -> BTreeMap<String, Series> {
        BTreeMap::from([(name.to_string(), series)])
    }

    #[test]
    fn rejects_inverted_band() {
        let err = ThresholdBand::new(200, 50).unwrap_err();
        assert_eq!(err, RangeError::InvalidThresholdBand { min: 200, max: 50 });
    }

    #[test]
    fn detects_single_interior_peak() {
        let trends = trends_of("Emma", series(2018, &[40, 120, 30]));
        let band = ThresholdBand::new(50, 200).unwrap();

        let profiles = detect(&trends, band);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Emma");
        assert_eq!(
            profiles[0].events,
            vec![SurgeEvent {
                year: 2019,
                count: 120
            }]
        );
    }

    #[test]
    fn plateau_produces_no_peak() {
        let trends = trends_of("Emma", series(2018, &[40, 40, 40]));
        let band = ThresholdBand::new(10, 100).unwrap();

        assert!(detect(&trends, band).is_empty());
    }

    #[test]
    fn endpoints_are_never_peaks() {
        // Maximum sits at the last index; no interior peak exists.
        let trends = trends_of("Jules", series(2018, &[10, 20, 90]));
        let band = ThresholdBand::new(10, 100).unwrap();

        assert!(detect(&trends, band).is_empty());
    }

    #[test]
    fn series_maximum_outside_band_excludes_the_name() {
        // Interior peak exists but the series maximum overshoots the band.
        let trends = trends_of("Emma", series(2018, &[40, 120, 30, 500]));
        let band = ThresholdBand::new(50, 200).unwrap();

        assert!(detect(&trends, band).is_empty());
    }

    #[test]
    fn peak_below_min_height_is_not_reported() {
        let trends = trends_of("Emma", series(2018, &[10, 30, 10, 60, 10]));
        let band = ThresholdBand::new(50, 200).unwrap();

        let profiles = detect(&trends, band);
        assert_eq!(profiles.len(), 1);
        assert_eq!(
            profiles[0].events,
            vec![SurgeEvent {
                year: 2021,
                count: 60
            }]
        );
    }

    #[test]
    fn closely_spaced_peaks_are_all_reported() {
        let trends = trends_of("Emma", series(2015, &[10, 80, 20, 90, 20]));
        let band = ThresholdBand::new(50, 200).unwrap();

        let profiles = detect(&trends, band);
        let years: Vec<i32> = profiles[0].events.iter().map(|e| e.year).collect();
        assert_eq!(years, vec![2016, 2018]);
    }

    #[test]
    fn names_keep_aggregation_order() {
        let mut trends = BTreeMap::new();
        trends.insert("Zoe".to_string(), series(2018, &[10, 80, 10]));
        trends.insert("Emma".to_string(), series(2018, &[10, 90, 10]));
        let band = ThresholdBand::new(50, 200).unwrap();

        let profiles = detect(&trends, band);
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Emma", "Zoe"]);
    }

    #[test]
    fn empty_trends_yield_empty_profiles() {
        let band = ThresholdBand::new(50, 200).unwrap();
        assert!(detect(&BTreeMap::new(), band).is_empty());
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let trends = trends_of("Emma", series(2018, &[10, 50, 10]));
        let band = ThresholdBand::new(50, 50).unwrap();

        let profiles = detect(&trends, band);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].events[0].count, 50);
    }
}
