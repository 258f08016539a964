//! Payload data types
//!
//! [`Payload`] is the read side, built leniently from a `serde_json::Value`.
//! [`PayloadDocument`] is the write side used by the feed builder; it
//! duplicates the lists under their legacy keys.

use super::{PayloadError, PayloadResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys checked, in order, for the breach headline list
const BREACH_KEYS: &[&str] = &["breaches", "hacks", "segment1"];

/// Keys checked, in order, for the news list
const NEWS_KEYS: &[&str] = &["rss", "segment3"];

/// A breach/leak headline
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BreachItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

/// A security news item
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

/// When the payload was generated
///
/// Producers write either an ISO-8601 string or epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedAt {
    Text(String),
    Millis(f64),
}

/// A parsed dashboard payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    /// `None` when the document had no usable breach list
    pub breaches: Option<Vec<BreachItem>>,
    /// `None` when the document had no usable news list
    pub rss: Option<Vec<FeedItem>>,
    pub summary: Option<String>,
    pub generated_at: Option<GeneratedAt>,
}

impl Payload {
    /// Parse a payload from raw JSON text
    pub fn from_json(text: &str) -> PayloadResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse a payload from an already decoded JSON value
    pub fn from_value(value: Value) -> PayloadResult<Self> {
        let object = match value {
            Value::Object(map) => map,
            other => return Err(PayloadError::NotAnObject(kind_of(&other))),
        };

        let breaches = first_array(&object, BREACH_KEYS)
            .map(|items| items.iter().map(BreachItem::from_value).collect());
        let rss = first_array(&object, NEWS_KEYS)
            .map(|items| items.iter().map(FeedItem::from_value).collect());

        Ok(Self {
            breaches,
            rss,
            summary: object.get("summary").and_then(scalar_text),
            generated_at: object.get("generated_at").and_then(GeneratedAt::from_value),
        })
    }

    /// Breach list, empty when absent
    pub fn breaches(&self) -> &[BreachItem] {
        self.breaches.as_deref().unwrap_or(&[])
    }

    /// News list, empty when absent
    pub fn rss(&self) -> &[FeedItem] {
        self.rss.as_deref().unwrap_or(&[])
    }
}

impl BreachItem {
    fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        Self {
            org: field(object, "org"),
            title: field(object, "title"),
            url: field(object, "url"),
            source: field(object, "source"),
            published: field(object, "published"),
        }
    }

    /// Headline shown for this breach: organisation, else title
    pub fn headline(&self) -> Option<&str> {
        self.org.as_deref().or(self.title.as_deref())
    }
}

impl From<FeedItem> for BreachItem {
    fn from(item: FeedItem) -> Self {
        Self {
            org: None,
            title: item.title,
            url: item.url,
            source: item.source,
            published: item.published,
        }
    }
}

impl FeedItem {
    fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        Self {
            title: field(object, "title"),
            url: field(object, "url"),
            source: field(object, "source"),
            published: field(object, "published"),
        }
    }
}

impl GeneratedAt {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.clone())),
            Value::Number(n) => n.as_f64().filter(|v| *v != 0.0).map(Self::Millis),
            _ => None,
        }
    }

    /// Resolve to an instant
    ///
    /// Strings without an offset are read in `tz`; bare dates are read as
    /// UTC midnight. Returns `None` when the value cannot be interpreted.
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => {
                if !ms.is_finite() {
                    return None;
                }
                DateTime::from_timestamp_millis(*ms as i64)
            }
            Self::Text(raw) => {
                let raw = raw.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                    return Some(dt.with_timezone(&Utc));
                }
                if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
                    return Some(dt.with_timezone(&Utc));
                }
                for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
                    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                        return tz
                            .from_local_datetime(&naive)
                            .earliest()
                            .map(|dt| dt.with_timezone(&Utc));
                    }
                }
                if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
                }
                None
            }
        }
    }
}

/// The document the feed builder writes
#[derive(Debug, Clone, Serialize)]
pub struct PayloadDocument {
    pub generated_at: String,
    pub summary: String,
    pub breaches: Vec<BreachItem>,
    pub hacks: Vec<BreachItem>,
    pub segment1: Vec<BreachItem>,
    pub rss: Vec<FeedItem>,
    pub segment3: Vec<FeedItem>,
}

impl PayloadDocument {
    pub fn new(
        generated_at: DateTime<Utc>,
        summary: String,
        breaches: Vec<BreachItem>,
        rss: Vec<FeedItem>,
    ) -> Self {
        Self {
            generated_at: generated_at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            summary,
            hacks: breaches.clone(),
            segment1: breaches.clone(),
            breaches,
            segment3: rss.clone(),
            rss,
        }
    }
}

fn first_array<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .find_map(|key| object.get(*key))
        .and_then(Value::as_array)
}

fn field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(scalar_text)
}

/// Render a scalar as text; empty strings and non-scalars count as absent
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_lists_are_none() {
        let payload = Payload::from_json(r#"{"summary":"ok"}"#).unwrap();
        assert!(payload.breaches.is_none());
        assert!(payload.rss.is_none());
        assert!(payload.breaches().is_empty());
        assert_eq!(payload.summary.as_deref(), Some("ok"));
    }

    #[test]
    fn test_non_array_breaches_treated_as_absent() {
        let payload = Payload::from_value(json!({"breaches": "oops", "rss": {"a": 1}})).unwrap();
        assert!(payload.breaches.is_none());
        assert!(payload.rss.is_none());
    }

    #[test]
    fn test_aliases() {
        let payload = Payload::from_value(json!({
            "segment1": [{"title": "Acme breached"}],
            "segment3": [{"title": "Patch Tuesday"}],
        }))
        .unwrap();
        assert_eq!(payload.breaches()[0].headline(), Some("Acme breached"));
        assert_eq!(payload.rss()[0].title.as_deref(), Some("Patch Tuesday"));

        // The canonical key wins over its aliases
        let payload = Payload::from_value(json!({
            "breaches": [],
            "hacks": [{"title": "ignored"}],
        }))
        .unwrap();
        assert_eq!(payload.breaches.map(|b| b.len()), Some(0));
    }

    #[test]
    fn test_malformed_items_degrade() {
        let payload = Payload::from_value(json!({
            "breaches": [42, {"org": "", "title": null, "source": 7, "published": true}],
        }))
        .unwrap();
        let breaches = payload.breaches();
        assert_eq!(breaches[0], BreachItem::default());
        assert_eq!(breaches[1].org, None);
        assert_eq!(breaches[1].title, None);
        assert_eq!(breaches[1].source.as_deref(), Some("7"));
        assert_eq!(breaches[1].published.as_deref(), Some("true"));
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(
            Payload::from_json("[1,2]"),
            Err(PayloadError::NotAnObject("an array"))
        ));
        assert!(matches!(Payload::from_json("{nope"), Err(PayloadError::Json(_))));
    }

    #[test]
    fn test_generated_at_falsy_values() {
        for value in [json!(""), json!(0), json!(null), json!([])] {
            let payload = Payload::from_value(json!({ "generated_at": value })).unwrap();
            assert!(payload.generated_at.is_none());
        }
    }

    #[test]
    fn test_generated_at_resolve() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();

        let iso = GeneratedAt::Text("2024-01-01T12:30:00.000000Z".to_string());
        assert_eq!(iso.resolve(&Utc), Some(expected));

        let naive = GeneratedAt::Text("2024-01-01T12:30:00".to_string());
        assert_eq!(naive.resolve(&Utc), Some(expected));

        let millis = GeneratedAt::Millis(expected.timestamp_millis() as f64);
        assert_eq!(millis.resolve(&Utc), Some(expected));

        let date = GeneratedAt::Text("2024-01-01".to_string());
        assert_eq!(
            date.resolve(&Utc),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );

        assert_eq!(GeneratedAt::Text("last tuesday".to_string()).resolve(&Utc), None);
    }

    #[test]
    fn test_document_duplicates_aliases() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let doc = PayloadDocument::new(
            at,
            "summary".to_string(),
            vec![BreachItem {
                title: Some("t".to_string()),
                ..Default::default()
            }],
            vec![FeedItem::default()],
        );
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["generated_at"], "2024-05-06T07:08:09.000000Z");
        assert_eq!(value["hacks"], value["breaches"]);
        assert_eq!(value["segment1"], value["breaches"]);
        assert_eq!(value["segment3"], value["rss"]);
        // Absent fields are omitted, not written as null
        assert_eq!(value["rss"][0], serde_json::json!({}));
        assert_eq!(value["breaches"][0], serde_json::json!({"title": "t"}));

        // What the builder writes, the dashboard reads back
        let payload = Payload::from_value(value).unwrap();
        assert_eq!(payload.breaches()[0].title.as_deref(), Some("t"));
        assert_eq!(payload.rss().len(), 1);
    }
}
