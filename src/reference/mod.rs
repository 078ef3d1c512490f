//! Static reference tables used by the field normalizers.
//!
//! Both tables are loaded once at startup and shared read-only via `Arc`
//! from then on; nothing here takes a lock.

mod loader;

pub use loader::{load_city_country_table, load_dial_code_table};

use std::collections::{HashMap, HashSet};

/// Country name → international dialing code.
///
/// Names are stored lowercased and trimmed in load order; lookups match by
/// substring, first loaded row wins.
#[derive(Debug, Clone)]
pub struct DialCodeTable {
    entries: Vec<(String, String)>,
}

impl DialCodeTable {
    /// Build from `(country, dial_code)` pairs. Rows with an empty side are
    /// dropped; a repeated country name keeps its first dial code.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut seen = HashSet::new();
        let mut table = Vec::new();
        for (country, dial) in entries {
            let country = country.trim().to_lowercase();
            let dial = dial.trim().to_string();
            if country.is_empty() || dial.is_empty() {
                continue;
            }
            if seen.insert(country.clone()) {
                table.push((country, dial));
            }
        }
        Self { entries: table }
    }

    /// Dial code for a country name: case-insensitive, trimmed, substring
    /// match against the loaded names.
    pub fn dial_code(&self, country: &str) -> Option<&str> {
        let needle = country.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(name, _)| name.contains(&needle))
            .map(|(_, dial)| dial.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// City → country gazetteer plus the set of known country names, used for
/// resolving free-text locations. Exact-match lookups only.
#[derive(Debug, Clone)]
pub struct CityCountryTable {
    city_to_country: HashMap<String, String>,
    countries: HashSet<String>,
}

impl CityCountryTable {
    /// Build from `(city, country)` pairs. Rows with an empty side are
    /// dropped; a repeated city name keeps its first country.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut city_to_country = HashMap::new();
        let mut countries = HashSet::new();
        for (city, country) in entries {
            let city = city.trim().to_string();
            let country = country.trim().to_string();
            if city.is_empty() || country.is_empty() {
                continue;
            }
            if !city_to_country.contains_key(&city) {
                city_to_country.insert(city, country.clone());
            }
            countries.insert(country);
        }
        Self {
            city_to_country,
            countries,
        }
    }

    pub fn is_country(&self, name: &str) -> bool {
        self.countries.contains(name)
    }

    pub fn country_of(&self, city: &str) -> Option<&str> {
        self.city_to_country.get(city).map(String::as_str)
    }

    pub fn city_count(&self) -> usize {
        self.city_to_country.len()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }
}
