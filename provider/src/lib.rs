pub mod adapter;
pub mod wmo;

pub use adapter::AdapterError;
pub use adapter::open_meteo::{
    GeoCity, fetch_city_summary, fetch_full_load, fetch_month_slice, month_start, search_cities,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Deviations beyond this many degrees count as warmer/cooler.
pub const DELTA_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Two locations with the same id are treated as the same place.
    pub fn id(&self) -> String {
        format!("{:.2}_{:.2}", self.latitude, self.longitude)
    }

    pub fn same_place(&self, other: &Location) -> bool {
        self.id() == other.id()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2},{:.2}", self.latitude, self.longitude)
    }
}

/// One navigation step worth of chart data: two index-aligned daily series.
///
/// `this_period[i]` and `reference_period[i]` both describe `dates[i]`, the
/// latter taken one year earlier. Missing samples are `None` and keep their
/// slot so alignment is never broken.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSlice {
    pub dates: Vec<NaiveDate>,
    pub this_period: Vec<Option<f32>>,
    pub reference_period: Vec<Option<f32>>,
    /// Index of today inside the slice, `None` for fully historic slices.
    pub today: Option<usize>,
    /// Signed difference against the reference day, drives marker tone.
    pub delta: f32,
}

impl MonthSlice {
    pub fn new(
        dates: Vec<NaiveDate>,
        this_period: Vec<Option<f32>>,
        reference_period: Vec<Option<f32>>,
        today: Option<usize>,
        delta: f32,
    ) -> Result<Self, AdapterError> {
        if dates.len() != this_period.len() || dates.len() != reference_period.len() {
            return Err(AdapterError::ParseError(format!(
                "misaligned series: {} dates, {} current, {} reference",
                dates.len(),
                this_period.len(),
                reference_period.len()
            )));
        }

        let today = today.filter(|&idx| idx < dates.len());

        Ok(Self {
            dates,
            this_period,
            reference_period,
            today,
            delta,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Last index that belongs to the observed (non-forecast) part.
    pub fn observed_end(&self) -> Option<usize> {
        match self.today {
            Some(idx) => Some(idx),
            None => self.len().checked_sub(1),
        }
    }

    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.this_period
            .iter()
            .chain(self.reference_period.iter())
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Same-day figures shown next to the chart after a full load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TodaySummary {
    pub weather_code: Option<u8>,
    pub current_temp: i32,
    pub today_max: Option<i32>,
    pub year_ago_code: Option<u8>,
    pub year_ago_temp: Option<i32>,
    pub delta: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullLoad {
    pub summary: TodaySummary,
    pub default_slice: MonthSlice,
}

/// Compact per-city figures used by list badges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub weather_code: Option<u8>,
    pub current_temp: i32,
    pub temp_diff: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn rejects_misaligned_series() {
        let result = MonthSlice::new(
            vec![day(1), day(2)],
            vec![Some(1.0), Some(2.0)],
            vec![Some(1.0)],
            None,
            0.0,
        );
        assert!(matches!(result, Err(AdapterError::ParseError(_))));
    }

    #[test]
    fn out_of_range_today_is_dropped() {
        let slice =
            MonthSlice::new(vec![day(1)], vec![Some(1.0)], vec![None], Some(4), 0.0).unwrap();
        assert_eq!(slice.today, None);
        assert_eq!(slice.observed_end(), Some(0));
    }

    #[test]
    fn value_range_skips_missing_samples() {
        let slice = MonthSlice::new(
            vec![day(1), day(2), day(3)],
            vec![Some(4.0), None, Some(-1.5)],
            vec![None, Some(9.0), None],
            Some(1),
            0.0,
        )
        .unwrap();
        assert_eq!(slice.value_range(), Some((-1.5, 9.0)));
    }

    #[test]
    fn location_id_rounds_to_two_decimals() {
        let a = Location::new(52.52, 13.41);
        let b = Location::new(52.5201, 13.4099);
        let c = Location::new(48.8566, 2.3522);
        assert_eq!(a.id(), "52.52_13.41");
        assert!(a.same_place(&b));
        assert!(!a.same_place(&c));
    }
}
