use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Raw upstream response as stored alongside a log record.
///
/// The store may hand back a JSON column (already structured), a text
/// column holding encoded JSON, or nothing at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Value>", into = "Option<Value>")]
pub enum RawResponse {
    #[default]
    Missing,
    Text(String),
    Structured(Value),
}

impl From<Option<Value>> for RawResponse {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawResponse::Missing,
            Some(Value::String(text)) => RawResponse::Text(text),
            Some(other) => RawResponse::Structured(other),
        }
    }
}

impl From<Option<String>> for RawResponse {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => RawResponse::Text(text),
            None => RawResponse::Missing,
        }
    }
}

impl From<RawResponse> for Option<Value> {
    fn from(response: RawResponse) -> Self {
        match response {
            RawResponse::Missing => None,
            RawResponse::Text(text) => Some(Value::String(text)),
            RawResponse::Structured(value) => Some(value),
        }
    }
}

/// A single API call log row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "apiName")]
    pub api_name: String,
    #[serde(rename = "createdAt", with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub response: RawResponse,
}

impl LogRecord {
    pub fn new(
        id: impl Into<String>,
        api_name: impl Into<String>,
        created_at: NaiveDateTime,
        response: RawResponse,
    ) -> Self {
        Self {
            id: id.into(),
            api_name: api_name.into(),
            created_at,
            response,
        }
    }
}

impl AsRef<LogRecord> for LogRecord {
    fn as_ref(&self) -> &LogRecord {
        self
    }
}

/// Business outcome of an API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Success,
    Failure,
    #[serde(rename = "No Data")]
    NoData,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Failure => "Failure",
            Status::NoData => "No Data",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason recorded for successful calls
pub const NO_REASON: &str = "-";

/// A log record together with its classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: LogRecord,
    pub status: Status,
    pub reason: String,
}

impl ClassifiedRecord {
    pub fn api_name(&self) -> &str {
        &self.record.api_name
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.record.created_at
    }
}

impl AsRef<LogRecord> for ClassifiedRecord {
    fn as_ref(&self) -> &LogRecord {
        &self.record
    }
}

/// Ids arrive as strings or integers depending on the source column type.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// `createdAt` serialization.
///
/// Accepts `2024-05-01T10:00:00`, `2024-05-01 10:00:00` (optionally with
/// fractional seconds) and RFC 3339 with an offset, which is normalized
/// to UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|dt| dt.naive_utc())
            })
    }

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMATS[0]).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid createdAt timestamp: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json_with_text_response() {
        let record: LogRecord = serde_json::from_value(json!({
            "id": 17,
            "apiName": "panDetails",
            "createdAt": "2024-05-01 10:15:00",
            "response": "{\"status\": true}"
        }))
        .unwrap();

        assert_eq!(record.id, "17");
        assert_eq!(record.api_name, "panDetails");
        assert_eq!(
            record.response,
            RawResponse::Text("{\"status\": true}".to_string())
        );
    }

    #[test]
    fn test_record_structured_and_missing_response() {
        let structured: LogRecord = serde_json::from_value(json!({
            "apiName": "mobileDetails",
            "createdAt": "2024-05-01T10:15:00.250",
            "response": {"status": true}
        }))
        .unwrap();
        assert_eq!(
            structured.response,
            RawResponse::Structured(json!({"status": true}))
        );
        assert_eq!(structured.id, "");

        let missing: LogRecord = serde_json::from_value(json!({
            "apiName": "mobileDetails",
            "createdAt": "2024-05-01T10:15:00",
            "response": null
        }))
        .unwrap();
        assert_eq!(missing.response, RawResponse::Missing);
    }

    #[test]
    fn test_timestamp_formats() {
        let a = timestamp::parse("2024-05-01T10:15:00").unwrap();
        let b = timestamp::parse("2024-05-01 10:15:00").unwrap();
        let c = timestamp::parse("2024-05-01T12:15:00+02:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(Status::NoData.to_string(), "No Data");
        assert_eq!(serde_json::to_value(Status::NoData).unwrap(), json!("No Data"));
    }
}
