//! localStorage persistence for markers, strokes, documents and the
//! first-run flag.
//!
//! Values are written as a versioned envelope `{"version":N,"data":...}`.
//! Anything older is decoded by an explicit migration keyed on the stored
//! version; corrupt values are logged and replaced by an empty set.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Document, Marker, Stroke};
use crate::state::annotation::{DEFAULT_PEN_COLOR, DEFAULT_PEN_WIDTH};
use crate::util::{clog, cwarn};

pub const SCHEMA_VERSION: u32 = 1;

pub const MARKERS_KEY: &str = "mapMarkers";
pub const STROKES_KEY: &str = "mapDrawPaths";
pub const DOCUMENTS_KEY: &str = "documents";
pub const GUIDE_SEEN_KEY: &str = "hasSeenWelcomeGuide";

#[derive(Debug)]
pub enum StorageError {
    Unavailable,
    Read,
    Write,
    Corrupt(serde_json::Error),
    UnsupportedVersion(u32),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "local storage unavailable"),
            StorageError::Read => write!(f, "local storage read failed"),
            StorageError::Write => write!(f, "local storage write failed"),
            StorageError::Corrupt(e) => write!(f, "corrupt stored value: {e}"),
            StorageError::UnsupportedVersion(v) => write!(f, "unsupported schema version {v}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Corrupt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Corrupt(e)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    data: Value,
}

/// A stored shape that can be brought forward from older versions and
/// written back in the current one.
pub trait Migrate: Sized + DeserializeOwned + Serialize {
    /// Decodes `data` written under `version` (0 = bare legacy JSON).
    fn migrate(version: u32, data: Value) -> Result<Self, StorageError>;
}

fn fill_missing(item: &mut Value, field: &str, default: Value) {
    if let Value::Object(map) = item {
        map.entry(field.to_string()).or_insert(default);
    }
}

impl Migrate for Vec<Marker> {
    fn migrate(version: u32, mut data: Value) -> Result<Self, StorageError> {
        match version {
            0 => {
                if let Value::Array(items) = &mut data {
                    for item in items.iter_mut() {
                        fill_missing(item, "note", Value::String(String::new()));
                    }
                }
                Ok(serde_json::from_value(data)?)
            }
            SCHEMA_VERSION => Ok(serde_json::from_value(data)?),
            v => Err(StorageError::UnsupportedVersion(v)),
        }
    }
}

impl Migrate for Vec<Stroke> {
    fn migrate(version: u32, mut data: Value) -> Result<Self, StorageError> {
        let strokes: Vec<Stroke> = match version {
            0 => {
                if let Value::Array(items) = &mut data {
                    for item in items.iter_mut() {
                        fill_missing(item, "color", Value::from(DEFAULT_PEN_COLOR));
                        fill_missing(item, "width", Value::from(DEFAULT_PEN_WIDTH));
                    }
                }
                serde_json::from_value(data)?
            }
            SCHEMA_VERSION => serde_json::from_value(data)?,
            v => return Err(StorageError::UnsupportedVersion(v)),
        };
        Ok(strokes.into_iter().filter(Stroke::is_drawable).collect())
    }
}

impl Migrate for Vec<Document> {
    fn migrate(version: u32, data: Value) -> Result<Self, StorageError> {
        match version {
            0 => {
                let urls: Vec<String> = serde_json::from_value(data)?;
                Ok(urls
                    .into_iter()
                    .enumerate()
                    .map(|(i, url)| Document {
                        id: format!("doc-{i}"),
                        url,
                    })
                    .collect())
            }
            SCHEMA_VERSION => Ok(serde_json::from_value(data)?),
            v => Err(StorageError::UnsupportedVersion(v)),
        }
    }
}

/// Parses a raw stored string, migrating legacy shapes. Returns the value and
/// the version it was stored under.
pub fn decode<T: Migrate>(raw: &str) -> Result<(T, u32), StorageError> {
    let value: Value = serde_json::from_str(raw)?;
    let is_envelope = matches!(
        &value,
        Value::Object(map) if map.contains_key("version") && map.contains_key("data")
    );
    let (version, data) = if is_envelope {
        let env: Envelope = serde_json::from_value(value)?;
        (env.version, env.data)
    } else {
        (0, value)
    };
    Ok((T::migrate(version, data)?, version))
}

pub fn encode<T: Serialize>(data: &T) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        data,
    })?)
}

fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or(StorageError::Unavailable)?
        .local_storage()
        .map_err(|_| StorageError::Unavailable)?
        .ok_or(StorageError::Unavailable)
}

fn read_raw(key: &str) -> Result<Option<String>, StorageError> {
    local_storage()?.get_item(key).map_err(|_| StorageError::Read)
}

fn write_raw(key: &str, value: &str) -> Result<(), StorageError> {
    local_storage()?
        .set_item(key, value)
        .map_err(|_| StorageError::Write)
}

fn try_load<T: Migrate>(key: &str) -> Result<Option<T>, StorageError> {
    let Some(raw) = read_raw(key)? else {
        return Ok(None);
    };
    let (value, version) = decode::<T>(&raw)?;
    if version != SCHEMA_VERSION {
        clog(&format!("storage: migrated {key} from v{version} to v{SCHEMA_VERSION}"));
        // rewrite so the migration runs once
        if let Err(e) = encode(&value).and_then(|s| write_raw(key, &s)) {
            cwarn(&format!("storage: could not rewrite migrated {key}: {e}"));
        }
    }
    Ok(Some(value))
}

/// Loads a list, falling back to empty on any failure.
pub fn load_list<T>(key: &str) -> Vec<T>
where
    Vec<T>: Migrate,
{
    match try_load::<Vec<T>>(key) {
        Ok(Some(items)) => {
            clog(&format!("storage: loaded {} item(s) from {key}", items.len()));
            items
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            cwarn(&format!("storage: discarding {key}: {e}"));
            Vec::new()
        }
    }
}

pub fn save<T: Serialize>(key: &str, data: &T) {
    let result = encode(data).and_then(|s| write_raw(key, &s));
    if let Err(e) = result {
        cwarn(&format!("storage: could not save {key}: {e}"));
    }
}

pub fn load_flag(key: &str) -> bool {
    matches!(read_raw(key), Ok(Some(v)) if v == "true" || v == "1")
}

pub fn save_flag(key: &str, value: bool) {
    if let Err(e) = write_raw(key, if value { "true" } else { "false" }) {
        cwarn(&format!("storage: could not save {key}: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MarkerKind, NormPoint};

    #[test]
    fn legacy_marker_array_gets_empty_note() {
        let raw = r#"[{"id":"marker-1","x":12.5,"y":40,"type":"radiation"}]"#;
        let (markers, version) = decode::<Vec<Marker>>(raw).unwrap();
        assert_eq!(version, 0);
        assert_eq!(markers[0].kind, MarkerKind::Radiation);
        assert_eq!(markers[0].note, "");
    }

    #[test]
    fn legacy_strokes_get_defaults_and_lose_single_points() {
        let raw = r##"[
            {"id":"p1","points":[{"x":1,"y":1},{"x":2,"y":2}]},
            {"id":"p2","points":[{"x":5,"y":5}],"color":"#00ff00","width":4}
        ]"##;
        let (strokes, _) = decode::<Vec<Stroke>>(raw).unwrap();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].color, DEFAULT_PEN_COLOR);
        assert_eq!(strokes[0].width, DEFAULT_PEN_WIDTH);
    }

    #[test]
    fn legacy_document_urls_become_identified_items() {
        let raw = r#"["a.png","data:image/png;base64,AAAA"]"#;
        let (docs, _) = decode::<Vec<Document>>(raw).unwrap();
        assert_eq!(docs[1].id, "doc-1");
        assert_eq!(docs[1].url, "data:image/png;base64,AAAA");
    }

    #[test]
    fn current_envelope_round_trips() {
        let strokes = vec![Stroke {
            id: "path-1".into(),
            points: vec![NormPoint { x: 0.0, y: 0.0 }, NormPoint { x: 50.0, y: 50.0 }],
            color: "#123456".into(),
            width: 5.0,
        }];
        let raw = encode(&strokes).unwrap();
        assert!(raw.starts_with(r#"{"version":1,"#));
        let (back, version) = decode::<Vec<Stroke>>(&raw).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(back, strokes);
    }

    #[test]
    fn legacy_stroke_keeps_its_own_color() {
        let raw = r##"[{"id":"p3","points":[{"x":0,"y":0},{"x":9,"y":9}],"color":"#00ff00"}]"##;
        let (strokes, _) = decode::<Vec<Stroke>>(raw).unwrap();
        assert_eq!(strokes[0].color, "#00ff00");
        assert_eq!(strokes[0].width, DEFAULT_PEN_WIDTH);
    }

    #[test]
    fn migrated_value_encodes_as_current_envelope() {
        let (markers, version) =
            decode::<Vec<Marker>>(r#"[{"id":"m1","x":1,"y":2,"type":"base"}]"#).unwrap();
        assert_eq!(version, 0);
        let rewritten = encode(&markers).unwrap();
        let (again, version) = decode::<Vec<Marker>>(&rewritten).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(again, markers);
    }

    #[test]
    fn documents_keep_their_ids_across_reload() {
        let docs = vec![
            Document { id: "doc-17".into(), url: "a.png".into() },
            Document { id: "doc-42".into(), url: "data:image/png;base64,AAAA".into() },
        ];
        let (back, _) = decode::<Vec<Document>>(&encode(&docs).unwrap()).unwrap();
        assert_eq!(back, docs);
    }

    #[test]
    fn corrupt_json_is_an_error() {
        assert!(matches!(
            decode::<Vec<Marker>>("{not json"),
            Err(StorageError::Corrupt(_))
        ));
        assert!(matches!(
            decode::<Vec<Marker>>(r#"{"oops":true}"#),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        assert!(matches!(
            decode::<Vec<Document>>(r#"{"version":9,"data":[]}"#),
            Err(StorageError::UnsupportedVersion(9))
        ));
    }
}
