//! Run configuration.
//!
//! The fixed values of a migration run live in [`ConverterConfig`]. Defaults
//! are those of the France migration, so an empty config file (or none at all)
//! runs that migration.
//!
//! ```json
//! {
//!   "inputs": ["Buildings_Broadband.xlsx"],
//!   "priceProfileIds": ["cm6ytex7r0000c4ka7rpd50a2"],
//!   "city": "France"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_INPUT: &str = "Buildings_Broadband.xlsx";
pub const DEFAULT_PRICE_PROFILE_ID: &str = "cm6ytex7r0000c4ka7rpd50a2";
pub const DEFAULT_CITY: &str = "France";
pub const DEFAULT_PROVIDER: &str = "PhibeeTelecom";
pub const DEFAULT_INTERFACE_TYPE: &str = "GigabitEthernet";
pub const DEFAULT_IPV4_PREFIX_LENGTH: u8 = 30;

/// Options for a conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterConfig {
    /// Workbooks to read, in order
    pub inputs: Vec<PathBuf>,

    /// Price profile per sheet, paired by sheet position
    pub price_profile_ids: Vec<String>,

    /// Explicit sheet name -> price profile map. When non-empty it replaces
    /// positional pairing.
    pub sheet_profiles: BTreeMap<String, String>,

    /// Label used in the output file names
    pub city: String,

    /// Provider name written on every provider row
    pub provider: String,

    /// Single interface type written on every provider row
    pub interface_type: String,

    /// Single IPv4 prefix length written on every provider row
    pub ipv4_prefix_length: u8,

    /// Directory receiving the two consolidated files
    pub output_dir: PathBuf,

    /// Skip rows whose latitude/longitude are not in range
    pub strict_coordinates: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            inputs: vec![PathBuf::from(DEFAULT_INPUT)],
            price_profile_ids: vec![DEFAULT_PRICE_PROFILE_ID.to_string()],
            sheet_profiles: BTreeMap::new(),
            city: DEFAULT_CITY.to_string(),
            provider: DEFAULT_PROVIDER.to_string(),
            interface_type: DEFAULT_INTERFACE_TYPE.to_string(),
            ipv4_prefix_length: DEFAULT_IPV4_PREFIX_LENGTH,
            output_dir: PathBuf::from("."),
            strict_coordinates: false,
        }
    }
}

impl ConverterConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse a config from JSON text.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would produce malformed output.
    ///
    /// An empty input list or profile list is allowed: the run then writes
    /// header-only files.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.city.trim().is_empty() {
            return Err(ConfigError::Invalid("city label is empty".into()));
        }
        if self.city.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "city label '{}' contains a path separator",
                self.city
            )));
        }
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("provider name is empty".into()));
        }
        if self.interface_type.trim().is_empty() {
            return Err(ConfigError::Invalid("interface type is empty".into()));
        }
        if self.ipv4_prefix_length > 32 {
            return Err(ConfigError::Invalid(format!(
                "IPv4 prefix length {} is greater than 32",
                self.ipv4_prefix_length
            )));
        }
        Ok(())
    }

    /// Replace the price profiles with a positional list.
    ///
    /// Any `sheetProfiles` map is cleared, otherwise it would keep taking
    /// precedence over the new list.
    pub fn set_price_profiles(&mut self, ids: Vec<String>) {
        self.price_profile_ids = ids;
        self.sheet_profiles.clear();
    }

    /// Whether any sheet can get a price profile at all.
    pub fn has_profiles(&self) -> bool {
        !self.price_profile_ids.is_empty() || !self.sheet_profiles.is_empty()
    }

    /// How sheets are matched to price profiles.
    pub fn profile_assignment(&self) -> ProfileAssignment<'_> {
        if self.sheet_profiles.is_empty() {
            ProfileAssignment::Positional(&self.price_profile_ids)
        } else {
            ProfileAssignment::ByName(&self.sheet_profiles)
        }
    }

    /// `<output_dir>/<city>_Consolidated_Buildings.csv`
    pub fn buildings_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_Consolidated_Buildings.csv", self.city))
    }

    /// `<output_dir>/<city>_Consolidated_Providers.csv`
    pub fn providers_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_Consolidated_Providers.csv", self.city))
    }
}

// =============================================================================
// Profile assignment
// =============================================================================

/// Strategy for choosing the price profile of a sheet.
#[derive(Debug, Clone, Copy)]
pub enum ProfileAssignment<'a> {
    /// The n-th sheet gets the n-th id. Running out stops the file.
    Positional(&'a [String]),
    /// Sheets are looked up by name. Unmapped sheets are skipped.
    ByName(&'a BTreeMap<String, String>),
}

/// Outcome of looking up a sheet's profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileLookup<'a> {
    Found(&'a str),
    /// Positional list used up; no further sheets in this file get a profile.
    Exhausted,
    /// No entry for this sheet name; later sheets may still match.
    Unmapped,
}

impl<'a> ProfileAssignment<'a> {
    pub fn lookup(&self, index: usize, sheet: &str) -> ProfileLookup<'a> {
        match *self {
            Self::Positional(ids) => ids
                .get(index)
                .map_or(ProfileLookup::Exhausted, |id| ProfileLookup::Found(id)),
            Self::ByName(map) => map
                .get(sheet)
                .map_or(ProfileLookup::Unmapped, |id| ProfileLookup::Found(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_france_migration() {
        let config = ConverterConfig::default();
        assert_eq!(config.city, "France");
        assert_eq!(config.provider, "PhibeeTelecom");
        assert_eq!(config.interface_type, "GigabitEthernet");
        assert_eq!(config.ipv4_prefix_length, 30);
        assert_eq!(config.price_profile_ids, vec!["cm6ytex7r0000c4ka7rpd50a2"]);
        assert!(!config.strict_coordinates);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ConverterConfig::from_json(
            r#"{"city": "New York", "priceProfileIds": ["pp1", "pp2"]}"#,
        )
        .unwrap();

        assert_eq!(config.city, "New York");
        assert_eq!(config.price_profile_ids, vec!["pp1", "pp2"]);
        assert_eq!(config.provider, "PhibeeTelecom");
        assert_eq!(config.inputs, vec![PathBuf::from("Buildings_Broadband.xlsx")]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("converter.json");
        fs::write(&path, r#"{"inputs": ["a.xlsx", "b.xlsx"], "ipv4PrefixLength": 29}"#).unwrap();

        let config = ConverterConfig::from_file(&path).unwrap();
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.ipv4_prefix_length, 29);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let result = ConverterConfig::from_json(r#"{"city": 12}"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ConverterConfig::default();
        config.city = "Paris/North".into();
        assert!(config.validate().is_err());

        let mut config = ConverterConfig::default();
        config.ipv4_prefix_length = 33;
        assert!(config.validate().is_err());

        let mut config = ConverterConfig::default();
        config.provider = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_allows_empty_lists() {
        let mut config = ConverterConfig::default();
        config.inputs.clear();
        config.price_profile_ids.clear();

        assert!(config.validate().is_ok());
        assert!(!config.has_profiles());
    }

    #[test]
    fn test_set_price_profiles_clears_sheet_map() {
        let mut config = ConverterConfig::from_json(
            r#"{"sheetProfiles": {"Paris": "pp-paris"}, "priceProfileIds": ["old"]}"#,
        )
        .unwrap();
        assert!(matches!(
            config.profile_assignment(),
            ProfileAssignment::ByName(_)
        ));

        config.set_price_profiles(vec!["pp1".into(), "pp2".into()]);

        assert!(config.sheet_profiles.is_empty());
        assert_eq!(
            config.profile_assignment().lookup(1, "Lyon"),
            ProfileLookup::Found("pp2")
        );
    }

    #[test]
    fn test_output_paths() {
        let mut config = ConverterConfig::default();
        config.output_dir = PathBuf::from("out");
        assert_eq!(
            config.buildings_path(),
            PathBuf::from("out/France_Consolidated_Buildings.csv")
        );
        assert_eq!(
            config.providers_path(),
            PathBuf::from("out/France_Consolidated_Providers.csv")
        );
    }

    #[test]
    fn test_positional_lookup() {
        let ids = vec!["pp1".to_string(), "pp2".to_string()];
        let assignment = ProfileAssignment::Positional(&ids);

        assert_eq!(assignment.lookup(0, "Paris"), ProfileLookup::Found("pp1"));
        assert_eq!(assignment.lookup(1, "Lyon"), ProfileLookup::Found("pp2"));
        assert_eq!(assignment.lookup(2, "Nice"), ProfileLookup::Exhausted);
    }

    #[test]
    fn test_by_name_lookup() {
        let mut map = BTreeMap::new();
        map.insert("Lyon".to_string(), "pp-lyon".to_string());
        let assignment = ProfileAssignment::ByName(&map);

        assert_eq!(assignment.lookup(0, "Paris"), ProfileLookup::Unmapped);
        assert_eq!(assignment.lookup(1, "Lyon"), ProfileLookup::Found("pp-lyon"));
    }

    #[test]
    fn test_sheet_profiles_switch_mode() {
        let mut config = ConverterConfig::default();
        assert!(matches!(
            config.profile_assignment(),
            ProfileAssignment::Positional(_)
        ));

        config.sheet_profiles.insert("Paris".into(), "pp1".into());
        assert!(matches!(
            config.profile_assignment(),
            ProfileAssignment::ByName(_)
        ));
    }
}
