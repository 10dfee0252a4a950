use super::{AdapterError, get_json};
use crate::{CitySummary, FullLoad, Location, MonthSlice, TodaySummary};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Deserialize;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// The default window spans 13 past days, today and 14 forecast days.
const PAST_DAYS: u64 = 13;
const FORECAST_DAYS: u64 = 15;

const SEARCH_RESULTS: usize = 5;

#[derive(Deserialize, Debug)]
struct ForecastResponse {
    current_weather: CurrentWeather,
    daily: Daily,
}

#[derive(Deserialize, Debug)]
struct CurrentWeather {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct ArchiveResponse {
    daily: Daily,
}

#[derive(Deserialize, Debug, Default)]
struct Daily {
    time: Vec<NaiveDate>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f32>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f32>>,
    #[serde(default)]
    weather_code: Vec<Option<u8>>,
}

impl Daily {
    fn max_on(&self, date: NaiveDate) -> Option<f32> {
        let idx = self.time.iter().position(|d| *d == date)?;
        self.temperature_2m_max.get(idx).copied().flatten()
    }

    fn first_mean(&self) -> Option<f32> {
        let max = self.temperature_2m_max.first().copied().flatten()?;
        let min = self.temperature_2m_min.first().copied().flatten()?;
        Some((max + min) / 2.0)
    }

    fn first_code(&self) -> Option<u8> {
        self.weather_code.first().copied().flatten()
    }
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeoCity>,
}

/// A geocoding search hit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoCity {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCity {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.admin1.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// First day of the month `offset` months away from `today`'s month.
pub fn month_start(today: NaiveDate, offset: i32) -> Option<NaiveDate> {
    let first = today.with_day(1)?;
    let months = Months::new(offset.unsigned_abs());
    if offset >= 0 {
        first.checked_add_months(months)
    } else {
        first.checked_sub_months(months)
    }
}

fn month_end(first: NaiveDate) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(1))?.pred_opt()
}

fn year_ago(date: NaiveDate) -> Result<NaiveDate, AdapterError> {
    date.checked_sub_months(Months::new(12))
        .ok_or_else(|| AdapterError::InvalidRequest(format!("no date one year before {date}")))
}

fn location_query(location: Location) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", location.latitude.to_string()),
        ("longitude", location.longitude.to_string()),
        ("timezone", "auto".to_string()),
    ]
}

fn archive_query(
    location: Location,
    start: NaiveDate,
    end: NaiveDate,
    daily: &str,
) -> Vec<(&'static str, String)> {
    let mut query = location_query(location);
    query.push(("start_date", start.to_string()));
    query.push(("end_date", end.to_string()));
    query.push(("daily", daily.to_string()));
    query
}

/// Loads the default (offset 0) slice together with today's summary figures.
pub async fn fetch_full_load(location: Location) -> Result<FullLoad, AdapterError> {
    let today = chrono::Local::now().date_naive();
    let ago = year_ago(today)?;

    let reference_start = ago
        .checked_sub_days(Days::new(PAST_DAYS))
        .ok_or_else(|| AdapterError::InvalidRequest("reference window start".to_string()))?;
    let reference_end = ago
        .checked_add_days(Days::new(FORECAST_DAYS - 1))
        .ok_or_else(|| AdapterError::InvalidRequest("reference window end".to_string()))?;

    let mut forecast_query = location_query(location);
    forecast_query.extend([
        ("current_weather", "true".to_string()),
        (
            "daily",
            "temperature_2m_max,temperature_2m_min,weather_code".to_string(),
        ),
        ("past_days", PAST_DAYS.to_string()),
        ("forecast_days", FORECAST_DAYS.to_string()),
    ]);
    let history_query = archive_query(
        location,
        ago,
        ago,
        "temperature_2m_max,temperature_2m_min,weather_code",
    );
    let reference_query =
        archive_query(location, reference_start, reference_end, "temperature_2m_max");

    let (forecast, history, reference) = tokio::try_join!(
        get_json::<ForecastResponse>(FORECAST_URL, &forecast_query),
        get_json::<ArchiveResponse>(ARCHIVE_URL, &history_query),
        get_json::<ArchiveResponse>(ARCHIVE_URL, &reference_query),
    )?;

    log::debug!("Full load for {location} fetched");

    build_full_load(today, forecast, &history.daily, reference.daily)
}

fn build_full_load(
    today: NaiveDate,
    forecast: ForecastResponse,
    history: &Daily,
    reference: Daily,
) -> Result<FullLoad, AdapterError> {
    let ForecastResponse {
        current_weather,
        daily,
    } = forecast;

    let len = daily.time.len();
    let today_idx = daily
        .time
        .iter()
        .position(|d| *d == today)
        .or(Some(PAST_DAYS as usize))
        .filter(|&idx| idx < len);

    let mut this_period = daily.temperature_2m_max;
    this_period.resize(len, None);
    let mut reference_period = reference.temperature_2m_max;
    reference_period.resize(len, None);

    let current = current_weather.temperature;
    let year_ago_mean = history.first_mean();
    let delta = year_ago_mean.map_or(0.0, |mean| current - mean);

    let summary = TodaySummary {
        weather_code: today_idx.and_then(|idx| daily.weather_code.get(idx).copied().flatten()),
        current_temp: current.round() as i32,
        today_max: today_idx
            .and_then(|idx| this_period[idx])
            .map(|t| t.round() as i32),
        year_ago_code: history.first_code(),
        year_ago_temp: year_ago_mean.map(|t| t.round() as i32),
        delta,
    };

    let default_slice = MonthSlice::new(daily.time, this_period, reference_period, today_idx, delta)?;

    Ok(FullLoad {
        summary,
        default_slice,
    })
}

/// Loads a whole calendar month `offset` months before the current one,
/// aligned by day of month with the same month one year earlier.
pub async fn fetch_month_slice(
    location: Location,
    offset: i32,
    today: NaiveDate,
) -> Result<MonthSlice, AdapterError> {
    if offset >= 0 {
        return Err(AdapterError::InvalidRequest(format!(
            "month slices are only fetched for past offsets, got {offset}"
        )));
    }

    let invalid = || AdapterError::InvalidRequest(format!("no calendar month at offset {offset}"));

    let first = month_start(today, offset).ok_or_else(invalid)?;
    let last = month_end(first).ok_or_else(invalid)?;
    let reference_first = year_ago(first)?;
    let reference_last = month_end(reference_first).ok_or_else(invalid)?;

    let this_query = archive_query(location, first, last, "temperature_2m_max");
    let reference_query =
        archive_query(location, reference_first, reference_last, "temperature_2m_max");

    let (this, reference) = tokio::try_join!(
        get_json::<ArchiveResponse>(ARCHIVE_URL, &this_query),
        get_json::<ArchiveResponse>(ARCHIVE_URL, &reference_query),
    )?;

    log::debug!("Month slice {offset} for {location} fetched");

    build_month_slice(first, last, &this.daily, &reference.daily)
}

fn build_month_slice(
    first: NaiveDate,
    last: NaiveDate,
    this: &Daily,
    reference: &Daily,
) -> Result<MonthSlice, AdapterError> {
    let dates: Vec<NaiveDate> = first.iter_days().take_while(|d| *d <= last).collect();

    let this_period = dates.iter().map(|d| this.max_on(*d)).collect();
    let reference_period = dates
        .iter()
        .map(|d| {
            NaiveDate::from_ymd_opt(d.year() - 1, d.month(), d.day())
                .and_then(|prior| reference.max_on(prior))
        })
        .collect();

    MonthSlice::new(dates, this_period, reference_period, None, 0.0)
}

/// Current conditions and the year-ago deviation for a list badge.
pub async fn fetch_city_summary(location: Location) -> Result<CitySummary, AdapterError> {
    let today = chrono::Local::now().date_naive();
    let ago = year_ago(today)?;

    let mut forecast_query = location_query(location);
    forecast_query.extend([
        ("current_weather", "true".to_string()),
        ("daily", "temperature_2m_max,weather_code".to_string()),
        ("past_days", "0".to_string()),
        ("forecast_days", "1".to_string()),
    ]);
    let history_query = archive_query(location, ago, ago, "temperature_2m_max,temperature_2m_min");

    let (forecast, history) = tokio::try_join!(
        get_json::<ForecastResponse>(FORECAST_URL, &forecast_query),
        get_json::<ArchiveResponse>(ARCHIVE_URL, &history_query),
    )?;

    let current = forecast.current_weather.temperature;
    let mean = history.daily.first_mean().ok_or_else(|| {
        AdapterError::ParseError(format!("no year-ago temperature for {location}"))
    })?;

    Ok(CitySummary {
        weather_code: forecast.daily.first_code(),
        current_temp: current.round() as i32,
        temp_diff: current - mean,
    })
}

pub async fn search_cities(query: String) -> Result<Vec<GeoCity>, AdapterError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(vec![]);
    }

    let params = [
        ("name", query.to_string()),
        ("count", SEARCH_RESULTS.to_string()),
        ("language", "en".to_string()),
        ("format", "json".to_string()),
    ];

    let response: GeocodingResponse = get_json(GEOCODING_URL, &params).await?;
    Ok(response.results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_start_crosses_year_boundary() {
        let today = date(2025, 2, 17);
        assert_eq!(month_start(today, 0), Some(date(2025, 2, 1)));
        assert_eq!(month_start(today, -1), Some(date(2025, 1, 1)));
        assert_eq!(month_start(today, -2), Some(date(2024, 12, 1)));
        assert_eq!(month_start(today, -11), Some(date(2024, 3, 1)));
    }

    #[test]
    fn parses_forecast_and_builds_default_slice() {
        let forecast: ForecastResponse = serde_json::from_str(
            r#"{
                "current_weather": { "temperature": 14.6, "weathercode": 3 },
                "daily": {
                    "time": ["2025-05-09", "2025-05-10", "2025-05-11"],
                    "temperature_2m_max": [15.2, 16.8, null],
                    "temperature_2m_min": [6.1, 7.0, 8.2],
                    "weather_code": [1, 3, 61]
                }
            }"#,
        )
        .unwrap();
        let history: ArchiveResponse = serde_json::from_str(
            r#"{ "daily": {
                "time": ["2024-05-10"],
                "temperature_2m_max": [18.0],
                "temperature_2m_min": [9.0],
                "weather_code": [2]
            } }"#,
        )
        .unwrap();
        let reference: ArchiveResponse = serde_json::from_str(
            r#"{ "daily": {
                "time": ["2024-05-09", "2024-05-10"],
                "temperature_2m_max": [17.1, 18.0]
            } }"#,
        )
        .unwrap();

        let load =
            build_full_load(date(2025, 5, 10), forecast, &history.daily, reference.daily).unwrap();

        let slice = &load.default_slice;
        assert_eq!(slice.len(), 3);
        assert_eq!(slice.today, Some(1));
        assert_eq!(slice.this_period, vec![Some(15.2), Some(16.8), None]);
        // reference padded to keep index alignment
        assert_eq!(slice.reference_period, vec![Some(17.1), Some(18.0), None]);

        assert_eq!(load.summary.current_temp, 15);
        assert_eq!(load.summary.today_max, Some(17));
        assert_eq!(load.summary.weather_code, Some(3));
        assert_eq!(load.summary.year_ago_code, Some(2));
        assert_eq!(load.summary.year_ago_temp, Some(14));
        assert!((load.summary.delta - (14.6 - 13.5)).abs() < 1e-4);
        assert_eq!(slice.delta, load.summary.delta);
    }

    #[test]
    fn month_slice_aligns_by_day_of_month() {
        let this: ArchiveResponse = serde_json::from_str(
            r#"{ "daily": {
                "time": ["2024-02-27", "2024-02-28", "2024-02-29"],
                "temperature_2m_max": [3.5, null, 5.0]
            } }"#,
        )
        .unwrap();
        let reference: ArchiveResponse = serde_json::from_str(
            r#"{ "daily": {
                "time": ["2023-02-27", "2023-02-28"],
                "temperature_2m_max": [1.0, 2.0]
            } }"#,
        )
        .unwrap();

        let slice = build_month_slice(
            date(2024, 2, 1),
            date(2024, 2, 29),
            &this.daily,
            &reference.daily,
        )
        .unwrap();

        assert_eq!(slice.len(), 29);
        assert_eq!(slice.today, None);
        assert_eq!(slice.this_period[26], Some(3.5));
        assert_eq!(slice.this_period[27], None);
        assert_eq!(slice.this_period[28], Some(5.0));
        assert_eq!(slice.reference_period[26], Some(1.0));
        assert_eq!(slice.reference_period[27], Some(2.0));
        // no Feb 29 in 2023
        assert_eq!(slice.reference_period[28], None);
        assert_eq!(slice.this_period[0], None);
    }

    #[test]
    fn geocoding_display_name_skips_missing_parts() {
        let response: GeocodingResponse = serde_json::from_str(
            r#"{ "results": [
                { "name": "Porto", "country": "Portugal", "admin1": "Porto",
                  "latitude": 41.15, "longitude": -8.61 },
                { "name": "Nowhere", "latitude": 0.0, "longitude": 0.0 }
            ] }"#,
        )
        .unwrap();

        assert_eq!(response.results[0].display_name(), "Porto, Porto, Portugal");
        assert_eq!(response.results[1].display_name(), "Nowhere");
        assert_eq!(response.results[0].location().id(), "41.15_-8.61");
    }

    #[test]
    fn empty_geocoding_response_has_no_results() {
        let response: GeocodingResponse = serde_json::from_str(r#"{ "generationtime_ms": 0.3 }"#)
            .unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn blank_search_skips_request() {
        let results = search_cities("   ".to_string()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn current_month_is_not_fetched_as_slice() {
        let result = fetch_month_slice(Location::new(0.0, 0.0), 0, date(2025, 5, 10)).await;
        assert!(matches!(result, Err(AdapterError::InvalidRequest(_))));
    }
}
