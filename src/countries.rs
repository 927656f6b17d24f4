use std::path::Path;

use anyhow::{bail, Result};

use crate::input::{float_values, read_csv, require_columns, string_values};

/// Header names the auxiliary countries CSV must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["country", "name", "latitude", "longitude"];

/// One auxiliary country row. `code` is the uppercased ISO code and
/// may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

/// Load the countries table, or nothing when the caller disabled the
/// augmenter. A resolved path pointing at no file is fatal; rows with
/// an empty name or unparseable coordinates are dropped.
pub fn load_countries(path: Option<&Path>) -> Result<Vec<Country>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    if !path.exists() {
        bail!("countries file not found: {}", path.display());
    }

    let df = read_csv(path)?;
    require_columns(&df, &REQUIRED_COLUMNS, "countries CSV")?;

    let codes = string_values(&df, "country")?;
    let names = string_values(&df, "name")?;
    let lats = float_values(&df, "latitude")?;
    let lons = float_values(&df, "longitude")?;

    let mut countries = Vec::with_capacity(names.len());
    for i in 0..names.len() {
        if names[i].is_empty() {
            continue;
        }
        let (Some(lat), Some(lon)) = (lats[i], lons[i]) else {
            continue;
        };
        countries.push(Country {
            code: codes[i].to_uppercase(),
            name: names[i].clone(),
            lon,
            lat,
        });
    }
    Ok(countries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_countries(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("countries.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn disabled_augmenter_loads_nothing() {
        assert!(load_countries(None).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_countries(Some(Path::new("/nonexistent/countries.csv"))).unwrap_err();
        assert!(err.to_string().starts_with("countries file not found"));
    }

    #[test]
    fn codes_are_uppercased_and_bad_rows_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_countries(
            dir.path(),
            "country,name,latitude,longitude\nch,Switzerland,46.8,8.2\nFR,France,not-a-number,2.2\nDE,,51.0,10.0\n",
        );

        let countries = load_countries(Some(&path)).unwrap();
        assert_eq!(
            countries,
            vec![Country {
                code: "CH".to_string(),
                name: "Switzerland".to_string(),
                lon: 8.2,
                lat: 46.8,
            }]
        );
    }

    #[test]
    fn missing_columns_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_countries(dir.path(), "country,name\nCH,Switzerland\n");

        let err = load_countries(Some(&path)).unwrap_err().to_string();
        assert_eq!(err, "missing required countries CSV columns: latitude, longitude");
    }
}
