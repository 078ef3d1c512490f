//! CSV loaders for the reference tables. Loading happens once at startup;
//! the resulting tables are handed to the normalizer as read-only values.

use std::path::Path;

use tracing::info;

use super::{CityCountryTable, DialCodeTable};
use crate::common::error::{Result, ScrubberError};

// Column names in the gazetteer CSV
const CITY_COLUMN: &str = "name";
const CITY_COUNTRY_COLUMN: &str = "country_name";

// Column names in the dial-code CSV
const DIAL_COLUMN: &str = "Dial";
const DIAL_COUNTRY_COLUMN: &str = "UNTERM English Short";

fn column_index(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| {
            ScrubberError::Config(format!(
                "Column '{}' not found in '{}'",
                column,
                path.display()
            ))
        })
}

/// Load the city/country gazetteer. Rows with an empty city or country are
/// skipped; a repeated city name keeps its first country.
pub fn load_city_country_table(path: impl AsRef<Path>) -> Result<CityCountryTable> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let city_idx = column_index(&headers, CITY_COLUMN, path)?;
    let country_idx = column_index(&headers, CITY_COUNTRY_COLUMN, path)?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        let city = record.get(city_idx).unwrap_or("").to_string();
        let country = record.get(country_idx).unwrap_or("").to_string();
        entries.push((city, country));
    }

    let table = CityCountryTable::from_entries(entries);
    info!(
        "Loaded gazetteer from {}: {} cities, {} countries",
        path.display(),
        table.city_count(),
        table.country_count()
    );
    Ok(table)
}

/// Load the country → dial-code table, preserving file order for the
/// substring lookup.
pub fn load_dial_code_table(path: impl AsRef<Path>) -> Result<DialCodeTable> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let country_idx = column_index(&headers, DIAL_COUNTRY_COLUMN, path)?;
    let dial_idx = column_index(&headers, DIAL_COLUMN, path)?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        let country = record.get(country_idx).unwrap_or("").to_string();
        let dial = record.get(dial_idx).unwrap_or("").to_string();
        entries.push((country, dial));
    }

    let table = DialCodeTable::from_entries(entries);
    info!(
        "Loaded {} dial codes from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_gazetteer() {
        let file = write_csv(
            "id,name,country_name\n\
             1,Paris,France\n\
             2,Lyon,France\n\
             3,,France\n\
             4,Berlin,Germany\n",
        );

        let table = load_city_country_table(file.path()).unwrap();
        assert_eq!(table.city_count(), 3);
        assert_eq!(table.country_of("Paris"), Some("France"));
        assert_eq!(table.country_of("Berlin"), Some("Germany"));
    }

    #[test]
    fn test_load_dial_codes_preserves_file_order() {
        let file = write_csv(
            "Dial,UNTERM English Short,ISO\n\
             224,Guinea,GN\n\
             245,Guinea-Bissau,GW\n\
             ,Nowhere,XX\n",
        );

        let table = load_dial_code_table(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.dial_code("guinea"), Some("224"));
    }

    #[test]
    fn test_missing_column_is_a_config_error() {
        let file = write_csv("city,country\nParis,France\n");

        let result = load_city_country_table(file.path());
        assert!(matches!(
            result,
            Err(ScrubberError::Config(message)) if message.contains("name")
        ));
    }
}
