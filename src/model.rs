use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-disk pin file shape: `{"pins": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PinFile {
    #[serde(default)]
    pub pins: Vec<Pin>,
}

/// A persisted map pin. Optional fields are added by reconciliation and
/// enrichment passes and stay out of the JSON until set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coed_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neis_code: Option<String>,
}

/// A deduplicated Kakao search result, kept as the raw snapshot for
/// later region reconciliation. Immutable once fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlace {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub road_address: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub url: String,
}

impl RawPlace {
    /// Road address when present, lot-number address otherwise.
    pub fn best_address(&self) -> &str {
        if self.road_address.is_empty() {
            &self.address
        } else {
            &self.road_address
        }
    }
}

/// Raw snapshot file: fetched reference records plus when they were
/// fetched. Used for both Kakao places and NEIS school records.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub fetched_at: DateTime<Utc>,
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

impl<T: Clone> Snapshot<T> {
    pub fn now(records: &[T]) -> Self {
        Snapshot {
            fetched_at: Utc::now(),
            records: records.to_vec(),
        }
    }
}

/// NEIS school attribute record, joined onto school pins by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchoolInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coed_type: String,
    #[serde(default)]
    pub found_type: String,
    #[serde(default)]
    pub sido: String,
    #[serde(default)]
    pub school_code: String,
    #[serde(default)]
    pub neis_code: String,
}

impl Pin {
    /// Convert a raw search result into the persisted pin shape.
    pub fn from_raw(place: &RawPlace) -> Self {
        Pin {
            latitude: place.latitude,
            longitude: place.longitude,
            title: place.name.clone(),
            description: place.best_address().to_string(),
            region: None,
            url: None,
            coed_type: None,
            found_type: None,
            neis_code: None,
        }
    }
}
