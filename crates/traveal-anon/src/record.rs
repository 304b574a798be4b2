//! Raw and anonymized trip record shapes

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use traveal_core::AnonymizationLevel;

/// A trip as captured by the app, identifying fields included.
///
/// Unrecognised fields (addresses, device ids, contact details) land in
/// `other` and never reach an anonymized record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTripRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub companions: Option<u32>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    /// `[lat, lng]`
    #[serde(default)]
    pub start_location: Option<(f64, f64)>,
    /// `[lat, lng]`
    #[serde(default)]
    pub end_location: Option<(f64, f64)>,
    #[serde(default)]
    pub start_time: Option<TripTime>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Identifiers arrive as strings or integers depending on the source table.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "user_id must be a string or number, got {other}"
        ))),
    }
}

/// A trip timestamp as recorded: with an offset, or device-local without one.
///
/// Neither form is converted to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TripTime {
    /// ISO 8601 / RFC 3339 with an offset
    Zoned(DateTime<FixedOffset>),
    /// ISO 8601 without an offset
    Local(NaiveDateTime),
}

impl TripTime {
    /// Zero minutes, seconds and sub-seconds, keeping the offset (if any).
    pub fn truncate_to_hour(self) -> Option<Self> {
        match self {
            TripTime::Zoned(ts) => ts
                .with_minute(0)?
                .with_second(0)?
                .with_nanosecond(0)
                .map(TripTime::Zoned),
            TripTime::Local(ts) => ts
                .with_minute(0)?
                .with_second(0)?
                .with_nanosecond(0)
                .map(TripTime::Local),
        }
    }
}

/// A coarsened, noise-perturbed coordinate pair (3 decimal places)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub lat_zone: f64,
    pub lng_zone: f64,
}

/// Privacy-reduced trip record for downstream analytics.
///
/// Holds no mapping back to the raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizedTripRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_area: Option<Area>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_area: Option<Area>,
    /// Start time truncated to the top of the hour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<TripTime>,
    pub anonymized_at: DateTime<Utc>,
    pub anonymization_level: AnonymizationLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_parses_and_captures_extras() {
        let raw: RawTripRecord = serde_json::from_str(
            r#"{
                "user_id": 42,
                "distance": 5200.5,
                "mode": "bus",
                "start_location": [10.8505, 76.2711],
                "start_time": "2024-03-05T08:47:12+05:30",
                "email": "someone@example.com",
                "start_address": "12 Main Road"
            }"#,
        )
        .unwrap();

        assert_eq!(raw.user_id.as_deref(), Some("42"));
        assert_eq!(raw.distance, Some(5200.5));
        assert_eq!(raw.start_location, Some((10.8505, 76.2711)));
        assert!(raw.end_location.is_none());
        assert!(raw.other.contains_key("email"));
        assert!(raw.other.contains_key("start_address"));
    }

    #[test]
    fn test_start_time_with_and_without_offset() {
        let zoned: RawTripRecord =
            serde_json::from_str(r#"{"start_time": "2024-03-05T08:47:12+05:30"}"#).unwrap();
        assert!(matches!(zoned.start_time, Some(TripTime::Zoned(_))));

        let local: RawTripRecord =
            serde_json::from_str(r#"{"user_id": "u", "start_time": "2024-03-05T08:47:12"}"#)
                .unwrap();
        assert!(matches!(local.start_time, Some(TripTime::Local(_))));
        assert_eq!(local.user_id.as_deref(), Some("u"));
    }

    #[test]
    fn test_truncate_to_hour_keeps_form() {
        let zoned: TripTime = serde_json::from_str(r#""2024-03-05T08:47:12.345+05:30""#).unwrap();
        assert_eq!(
            serde_json::to_value(zoned.truncate_to_hour().unwrap()).unwrap(),
            "2024-03-05T08:00:00+05:30"
        );

        let local: TripTime = serde_json::from_str(r#""2024-03-05T23:59:59.9""#).unwrap();
        assert_eq!(
            serde_json::to_value(local.truncate_to_hour().unwrap()).unwrap(),
            "2024-03-05T23:00:00"
        );
    }

    #[test]
    fn test_user_id_rejects_objects() {
        let result = serde_json::from_str::<RawTripRecord>(r#"{"user_id": {"a": 1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_anonymized_record_omits_missing_fields() {
        let record = AnonymizedTripRecord {
            user_hash: None,
            distance: Some(1.0),
            duration: None,
            mode: None,
            purpose: None,
            companions: None,
            weather: None,
            time_of_day: None,
            start_area: Some(Area {
                lat_zone: 10.85,
                lng_zone: 76.271,
            }),
            end_area: None,
            start_hour: None,
            anonymized_at: Utc::now(),
            anonymization_level: AnonymizationLevel::Low,
        };
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();

        assert!(!obj.contains_key("user_hash"));
        assert!(!obj.contains_key("end_area"));
        assert_eq!(obj["anonymization_level"], "low");
        assert_eq!(obj["start_area"]["lat_zone"], 10.85);
    }
}
