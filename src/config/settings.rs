//! Site settings singleton (locations and related reference data)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

lazy_static! {
    static ref POSTAL_CODE: Regex = Regex::new(r"\b\d{4,5}\b").unwrap();
}

/// Served areas used when the settings carry no locations
pub const FALLBACK_AREAS: [&str; 3] = ["Winterthur", "Tägerwilen", "Schaffhausen"];

/// A business location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub street: Option<String>,
    /// Postal code and locality, e.g. `8400 Winterthur`
    pub city: Option<String>,
}

impl Location {
    /// The first standalone 4-5 digit number in the city line
    pub fn postal_code(&self) -> Option<&str> {
        let city = self.city.as_deref()?;
        POSTAL_CODE.find(city).map(|m| m.as_str())
    }
}

/// Read-only site settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// `None` when the settings file has no locations entry at all
    pub locations: Option<Vec<Location>>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl SiteSettings {
    /// Load settings from a YAML file. A missing file yields empty settings.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No site settings at {:?}", path);
            return Ok(SiteSettings::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read site settings {:?}", path))?;
        let settings = serde_yaml::from_str::<Option<SiteSettings>>(&content)
            .with_context(|| format!("Failed to parse site settings {:?}", path))?;
        Ok(settings.unwrap_or_default())
    }

    /// The first location, used for the postal address
    pub fn main_location(&self) -> Option<&Location> {
        self.locations.as_ref().and_then(|locations| locations.first())
    }

    /// Areas served: explicit areas if given, else location names, else
    /// `fallback`. Duplicates are dropped, first occurrence wins.
    pub fn served_areas(&self, explicit: Option<&[String]>, fallback: &[&str]) -> Vec<String> {
        let areas: Vec<String> = match (explicit, &self.locations) {
            (Some(explicit), _) => explicit.to_vec(),
            (None, Some(locations)) => locations.iter().map(|loc| loc.name.clone()).collect(),
            (None, None) => fallback.iter().map(|s| s.to_string()).collect(),
        };

        let mut unique: Vec<String> = Vec::with_capacity(areas.len());
        for area in areas {
            if !unique.contains(&area) {
                unique.push(area);
            }
        }
        unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(yaml: &str) -> SiteSettings {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_locations() {
        let settings = settings(
            r#"
locations:
  - name: Winterthur
    street: Musterstrasse 1
    city: 8400 Winterthur
  - name: Schaffhausen
    city: CH-8200 Schaffhausen
phone: "+41 52 000 00 00"
"#,
        );
        let main = settings.main_location().unwrap();
        assert_eq!(main.street.as_deref(), Some("Musterstrasse 1"));
        assert_eq!(main.postal_code(), Some("8400"));
        assert_eq!(
            settings.locations.as_ref().unwrap()[1].postal_code(),
            Some("8200")
        );
        assert!(settings.extra.contains_key("phone"));
    }

    #[test]
    fn test_postal_code_absent() {
        let location = Location {
            name: "HQ".to_string(),
            street: None,
            city: Some("Winterthur".to_string()),
        };
        assert_eq!(location.postal_code(), None);
        assert_eq!(Location::default().postal_code(), None);
    }

    #[test]
    fn test_served_areas_precedence() {
        let with_locations = settings("locations:\n  - name: A\n  - name: B\n  - name: A\n");
        assert_eq!(with_locations.served_areas(None, &FALLBACK_AREAS), vec!["A", "B"]);

        let explicit = vec!["Zürich".to_string()];
        assert_eq!(
            with_locations.served_areas(Some(&explicit), &FALLBACK_AREAS),
            vec!["Zürich"]
        );

        let empty = SiteSettings::default();
        assert_eq!(
            empty.served_areas(None, &FALLBACK_AREAS),
            vec!["Winterthur", "Tägerwilen", "Schaffhausen"]
        );

        // An explicit empty list is not replaced by the fallback
        let no_locations = settings("locations: []\n");
        assert!(no_locations.served_areas(None, &FALLBACK_AREAS).is_empty());
    }
}
