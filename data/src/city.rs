use provider::{CitySummary, GeoCity, Location};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    /// Last known badge figures, refreshed on every full load.
    #[serde(default)]
    pub summary: Option<CitySummary>,
}

impl City {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    pub fn id(&self) -> String {
        self.location().id()
    }
}

impl From<GeoCity> for City {
    fn from(geo: GeoCity) -> Self {
        let display_name = geo.display_name();
        City {
            name: geo.name,
            country: geo.country,
            latitude: geo.latitude,
            longitude: geo.longitude,
            display_name,
            summary: None,
        }
    }
}

/// Ordered list of tracked cities plus the selected one, keyed by [`Location::id`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityStore {
    cities: Vec<City>,
    selected: Option<String>,
}

impl CityStore {
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.id() == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.cities.iter().position(|c| c.id() == id)
    }

    /// Appends the city unless one at the same place exists. Returns its id either way.
    pub fn add(&mut self, city: City) -> String {
        let id = city.id();
        if self.position(&id).is_none() {
            log::info!("Tracking city {} ({id})", city.display_name);
            self.cities.push(city);
        }
        id
    }

    /// Removes the city, moving the selection to a neighbour if it was selected.
    pub fn remove(&mut self, id: &str) -> Option<City> {
        let idx = self.position(id)?;
        let removed = self.cities.remove(idx);

        if self.selected.as_deref() == Some(id) {
            self.selected = self.cities.first().map(City::id);
        }

        Some(removed)
    }

    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.cities.len() || to >= self.cities.len() || from == to {
            return;
        }
        let city = self.cities.remove(from);
        self.cities.insert(to, city);
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.position(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// The selected city, or the first one when nothing valid is selected.
    pub fn selected(&self) -> Option<&City> {
        self.selected
            .as_deref()
            .and_then(|id| self.find(id))
            .or_else(|| self.cities.first())
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected().map(City::id)
    }

    pub fn update_summary(&mut self, id: &str, summary: CitySummary) {
        if let Some(city) = self.cities.iter_mut().find(|c| c.id() == id) {
            city.summary = Some(summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, lat: f64, lon: f64) -> City {
        City {
            name: name.to_string(),
            country: None,
            latitude: lat,
            longitude: lon,
            display_name: name.to_string(),
            summary: None,
        }
    }

    fn store() -> CityStore {
        let mut store = CityStore::default();
        store.add(city("Berlin", 52.52, 13.41));
        store.add(city("Paris", 48.85, 2.35));
        store.add(city("Oslo", 59.91, 10.75));
        store
    }

    fn names(store: &CityStore) -> Vec<&str> {
        store.cities().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn add_deduplicates_by_place() {
        let mut store = store();
        let id = store.add(city("Berlin Mitte", 52.5201, 13.4099));
        assert_eq!(id, "52.52_13.41");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn selected_falls_back_to_first() {
        let mut store = store();
        assert_eq!(store.selected().map(|c| c.name.as_str()), Some("Berlin"));
        assert!(store.select("48.85_2.35"));
        assert!(!store.select("0.00_0.00"));
        assert_eq!(store.selected().map(|c| c.name.as_str()), Some("Paris"));
    }

    #[test]
    fn removing_selected_falls_back_to_first() {
        let mut store = store();
        store.select("48.85_2.35");
        store.remove("48.85_2.35");
        assert_eq!(store.selected().map(|c| c.name.as_str()), Some("Berlin"));

        store.select("59.91_10.75");
        store.remove("52.52_13.41");
        assert_eq!(store.selected().map(|c| c.name.as_str()), Some("Oslo"));

        store.remove("59.91_10.75");
        assert!(store.selected().is_none());
    }

    #[test]
    fn reorder_ignores_out_of_bounds() {
        let mut store = store();
        store.reorder(0, 2);
        assert_eq!(names(&store), ["Paris", "Oslo", "Berlin"]);
        store.reorder(0, 7);
        assert_eq!(names(&store), ["Paris", "Oslo", "Berlin"]);
    }

    #[test]
    fn summary_round_trips_through_json() {
        let mut store = store();
        let summary = CitySummary {
            weather_code: Some(3),
            current_temp: 12,
            temp_diff: -1.5,
        };
        store.update_summary("52.52_13.41", summary);

        let json = serde_json::to_string(&store).unwrap();
        let restored: CityStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.find("52.52_13.41").and_then(|c| c.summary), Some(summary));
    }
}
