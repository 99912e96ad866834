use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// One harvested listing. Every field may be missing on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: Option<i64>,
    pub url: Option<String>,
    pub price: Option<i64>,
    pub date: DateInfo,
    pub location: Location,
    pub contact_information: ContactInformation,
    pub apartment_parameters: ApartmentParameters,
}

impl ListingRecord {
    /// Photo presence is what the final output keeps.
    pub fn has_photos(&self) -> bool {
        self.apartment_parameters.photos.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateInfo {
    pub create_date: Option<String>,
    pub update_date: Option<String>,
    pub available: bool,
}

impl Default for DateInfo {
    fn default() -> Self {
        Self {
            create_date: None,
            update_date: None,
            available: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub region: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub microdistrict: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
    pub coordinates: Option<Coordinates>,
}

/// Map position of a listing.
///
/// `Absent` is the site saying there is no position, which is not the same
/// as failing to find one (`None` on the owning field). It is stored as the
/// string `"false"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinates {
    /// `[lat, lon]`
    Point([f64; 2]),
    Absent,
}

pub const ABSENT_COORDINATES: &str = "false";

impl Serialize for Coordinates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Coordinates::Point(pair) => pair.serialize(serializer),
            Coordinates::Absent => serializer.serialize_str(ABSENT_COORDINATES),
        }
    }
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Pair([f64; 2]),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Pair(pair) => Ok(Coordinates::Point(pair)),
            Raw::Marker(m) if m == ABSENT_COORDINATES => Ok(Coordinates::Absent),
            Raw::Marker(m) => Err(de::Error::custom(format!(
                "expected [lat, lon] or \"false\", got {m:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInformation {
    pub contact: Option<String>,
    pub company: Option<String>,
    pub phone: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApartmentParameters {
    pub apart_type: Option<String>,
    pub total_area: Option<f64>,
    pub living_area: Option<f64>,
    pub kitchen_area: Option<f64>,
    pub floor: Option<i32>,
    pub floors: Option<i32>,
    pub sale_status: Option<String>,
    pub description: Option<String>,
    /// `None` when the page has no gallery, a list (maybe empty) when it does
    pub photos: Option<Vec<String>>,
}

/// Marker written next to a page batch once every listing on it was recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageManifest {
    pub page: u32,
    pub listings: usize,
    pub records: usize,
    pub completed_at: DateTime<Utc>,
}
