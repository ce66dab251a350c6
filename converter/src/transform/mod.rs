//! Row transformation.
//!
//! One spreadsheet row (`name, address, latitude, longitude`) becomes one
//! [`BuildingRecord`] and one [`ProviderRecord`] that points back at it.
//!
//! Identifiers come from an [`IdGenerator`] and timestamps from a [`Clock`],
//! so both can be pinned in tests. [`pipeline`] drives the transformer over
//! whole workbooks.

pub mod pipeline;

pub use pipeline::{run, Converter, RunSummary};

use chrono::{Duration, Local, NaiveDateTime};
use uuid::Uuid;

use crate::config::ConverterConfig;
use crate::error::TransformError;
use crate::models::{BuildingRecord, ProviderRecord};

/// Hours added to the wall clock before stamping records.
pub const TIMESTAMP_SHIFT_HOURS: i64 = 8;

// =============================================================================
// Identifiers
// =============================================================================

/// Source of unique, creation-ordered identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// UUIDv7 identifiers in 32-character lowercase hex.
///
/// The leading 48 bits are a millisecond timestamp, so ids sort by creation
/// order.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Ids;

impl IdGenerator for UuidV7Ids {
    fn next_id(&mut self) -> String {
        Uuid::now_v7().simple().to_string()
    }
}

// =============================================================================
// Clock
// =============================================================================

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Timestamp written on records: wall clock shifted forward by eight hours.
pub fn processing_timestamp(clock: &impl Clock) -> NaiveDateTime {
    clock.now() + Duration::hours(TIMESTAMP_SHIFT_HOURS)
}

// =============================================================================
// Transformer
// =============================================================================

/// The two records produced from one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecords {
    pub building: BuildingRecord,
    pub provider: ProviderRecord,
}

/// Maps raw rows to records using the run's fixed provider constants.
pub struct RowTransformer<I = UuidV7Ids, C = SystemClock> {
    ids: I,
    clock: C,
    provider: String,
    interface_type: String,
    ipv4_prefix_length: u8,
    strict_coordinates: bool,
}

impl RowTransformer {
    /// Transformer with UUIDv7 ids and the system clock.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::with_parts(config, UuidV7Ids, SystemClock)
    }
}

impl<I: IdGenerator, C: Clock> RowTransformer<I, C> {
    pub fn with_parts(config: &ConverterConfig, ids: I, clock: C) -> Self {
        Self {
            ids,
            clock,
            provider: config.provider.clone(),
            interface_type: config.interface_type.clone(),
            ipv4_prefix_length: config.ipv4_prefix_length,
            strict_coordinates: config.strict_coordinates,
        }
    }

    /// Build the building and provider records for one data row.
    ///
    /// Cells are mapped by position: 0 name, 1 address, 2 latitude,
    /// 3 longitude. Extra cells are ignored.
    pub fn transform(
        &mut self,
        row: &[String],
        price_profile_id: &str,
    ) -> Result<RowRecords, TransformError> {
        let [name, address, latitude, longitude, ..] = row else {
            return Err(TransformError::SkipRow { cells: row.len() });
        };

        if self.strict_coordinates {
            check_coordinate("latitude", latitude, 90.0)?;
            check_coordinate("longitude", longitude, 180.0)?;
        }

        let stamp = processing_timestamp(&self.clock);
        let building_id = self.ids.next_id();

        let building = BuildingRecord {
            id: building_id.clone(),
            create_time: stamp,
            update_time: stamp,
            name: name.clone(),
            latitude: latitude.clone(),
            longitude: longitude.clone(),
            address: address.clone(),
            google_maps_place_id: None,
            system_managed: false,
        };

        let provider = ProviderRecord {
            id: self.ids.next_id(),
            create_time: stamp,
            update_time: stamp,
            provider: self.provider.clone(),
            system_managed: false,
            interface_types: vec![self.interface_type.clone()],
            ipv4_prefix_lengths: vec![self.ipv4_prefix_length],
            building_id,
            price_profile_id: price_profile_id.to_string(),
        };

        Ok(RowRecords { building, provider })
    }
}

fn check_coordinate(field: &'static str, value: &str, limit: f64) -> Result<(), TransformError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && (-limit..=limit).contains(&v) => Ok(()),
        _ => Err(TransformError::InvalidCoordinate {
            field,
            value: value.to_string(),
        }),
    }
}
