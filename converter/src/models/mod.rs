//! Output records for the consolidated exports.
//!
//! - [`BuildingRecord`] - One row of `<city>_Consolidated_Buildings.csv`
//! - [`ProviderRecord`] - One row of `<city>_Consolidated_Providers.csv`
//!
//! Field values are rendered the way the importing database expects them:
//! booleans as `t`/`f`, an absent place id as `NULL`, and set-valued columns as
//! PostgreSQL array literals (`{GigabitEthernet}`).

use chrono::NaiveDateTime;

/// Timestamp format used in both exports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header of the buildings export.
pub const BUILDING_HEADER: [&str; 9] = [
    "id",
    "createTime",
    "updateTime",
    "name",
    "latitude",
    "longitude",
    "address",
    "googleMapsPlaceId",
    "systemManaged",
];

/// Header of the providers export.
pub const PROVIDER_HEADER: [&str; 9] = [
    "id",
    "createTime",
    "updateTime",
    "provider",
    "systemManaged",
    "interfaceTypes",
    "ipv4PrefixLengths",
    "buildingId",
    "priceProfileId",
];

// =============================================================================
// Building
// =============================================================================

/// A building as written to the buildings export.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecord {
    pub id: String,
    pub create_time: NaiveDateTime,
    pub update_time: NaiveDateTime,
    pub name: String,
    /// Raw cell text, not validated unless strict coordinates are enabled.
    pub latitude: String,
    pub longitude: String,
    pub address: String,
    pub google_maps_place_id: Option<String>,
    pub system_managed: bool,
}

impl BuildingRecord {
    /// Fields in [`BUILDING_HEADER`] order.
    pub fn to_row(&self) -> [String; 9] {
        [
            self.id.clone(),
            format_timestamp(&self.create_time),
            format_timestamp(&self.update_time),
            self.name.clone(),
            self.latitude.clone(),
            self.longitude.clone(),
            self.address.clone(),
            nullable(self.google_maps_place_id.as_deref()),
            pg_bool(self.system_managed).to_string(),
        ]
    }
}

// =============================================================================
// Provider
// =============================================================================

/// A provider-to-building association as written to the providers export.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRecord {
    pub id: String,
    pub create_time: NaiveDateTime,
    pub update_time: NaiveDateTime,
    pub provider: String,
    pub system_managed: bool,
    pub interface_types: Vec<String>,
    pub ipv4_prefix_lengths: Vec<u8>,
    /// Id of the [`BuildingRecord`] emitted for the same row.
    pub building_id: String,
    pub price_profile_id: String,
}

impl ProviderRecord {
    /// Fields in [`PROVIDER_HEADER`] order.
    pub fn to_row(&self) -> [String; 9] {
        [
            self.id.clone(),
            format_timestamp(&self.create_time),
            format_timestamp(&self.update_time),
            self.provider.clone(),
            pg_bool(self.system_managed).to_string(),
            pg_array(&self.interface_types),
            pg_array(&self.ipv4_prefix_lengths),
            self.building_id.clone(),
            self.price_profile_id.clone(),
        ]
    }
}

// =============================================================================
// Field rendering
// =============================================================================

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// PostgreSQL boolean text.
pub fn pg_bool(value: bool) -> &'static str {
    if value {
        "t"
    } else {
        "f"
    }
}

/// PostgreSQL array literal, e.g. `{30}` or `{a,b}`.
pub fn pg_array<T: ToString>(values: &[T]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("{{{}}}", items.join(","))
}

fn nullable(value: Option<&str>) -> String {
    value.unwrap_or("NULL").to_string()
}
