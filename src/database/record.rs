use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Fields assigned by the server; API input may not set them
const SYSTEM_FIELDS: &[&str] = &["id", "created_at"];

/// A stored note/story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Errors raised while turning API input into a record or a patch
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("System field '{0}' cannot be set via API input")]
    SystemFieldNotAllowed(&'static str),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Invalid fields: {}", describe(.0))]
    InvalidFields(HashMap<String, String>),
    #[error("Update must set at least one of title, body or tags")]
    EmptyPatch,
}

fn describe(fields: &HashMap<String, String>) -> String {
    let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

/// Raw request body for create and update. Every field is optional here so
/// that missing and empty values get the same field-level error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Validated input for a create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

/// Validated input for an update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl RecordPayload {
    /// Parse a JSON body, rejecting system fields and wrong value types
    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        let map = match json {
            Value::Object(map) => map,
            _ => return Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        };

        if let Some(field) = SYSTEM_FIELDS.iter().find(|f| map.contains_key(**f)) {
            return Err(RecordError::SystemFieldNotAllowed(*field));
        }

        serde_json::from_value(Value::Object(map)).map_err(|e| RecordError::InvalidJson(e.to_string()))
    }

    /// Title and body are required and must not be blank; tags default to empty
    pub fn into_new_record(self) -> Result<NewRecord, RecordError> {
        let mut field_errors = HashMap::new();

        let title = required_text("title", self.title, &mut field_errors);
        let body = required_text("body", self.body, &mut field_errors);

        match (title, body) {
            (Some(title), Some(body)) if field_errors.is_empty() => Ok(NewRecord {
                title,
                body,
                tags: self.tags.unwrap_or_default(),
            }),
            _ => Err(RecordError::InvalidFields(field_errors)),
        }
    }

    /// Merge-patch: only provided fields are kept, provided text must not be blank
    pub fn into_patch(self) -> Result<RecordPatch, RecordError> {
        if self.title.is_none() && self.body.is_none() && self.tags.is_none() {
            return Err(RecordError::EmptyPatch);
        }

        let mut field_errors = HashMap::new();
        for (name, value) in [("title", &self.title), ("body", &self.body)] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                field_errors.insert(name.to_string(), "This field must not be empty".to_string());
            }
        }
        if !field_errors.is_empty() {
            return Err(RecordError::InvalidFields(field_errors));
        }

        Ok(RecordPatch {
            title: self.title,
            body: self.body,
            tags: self.tags,
        })
    }
}

fn required_text(
    name: &str,
    value: Option<String>,
    field_errors: &mut HashMap<String, String>,
) -> Option<String> {
    match value {
        None => {
            field_errors.insert(name.to_string(), "This field is required".to_string());
            None
        }
        Some(v) if v.trim().is_empty() => {
            field_errors.insert(name.to_string(), "This field must not be empty".to_string());
            None
        }
        Some(v) => Some(v),
    }
}

impl NewRecord {
    /// Assign identity and creation time
    pub fn into_record(self, created_at: DateTime<Utc>) -> Record {
        Record {
            id: Uuid::new_v4(),
            title: self.title,
            body: self.body,
            tags: self.tags,
            created_at,
        }
    }
}

impl RecordPatch {
    /// Overwrite the provided fields; id and created_at never change
    pub fn apply(&self, record: &mut Record) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(body) = &self.body {
            record.body = body.clone();
        }
        if let Some(tags) = &self.tags {
            record.tags = tags.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RecordPayload {
        RecordPayload::from_json(value).unwrap()
    }

    #[test]
    fn new_record_defaults_tags_to_empty() {
        let new = payload(json!({"title": "A", "body": "x"})).into_new_record().unwrap();
        assert_eq!(new.tags, Vec::<String>::new());

        let new = payload(json!({"title": "A", "body": "x", "tags": null})).into_new_record().unwrap();
        assert!(new.tags.is_empty());
    }

    #[test]
    fn new_record_reports_every_missing_field() {
        let err = payload(json!({"tags": ["a"]})).into_new_record().unwrap_err();
        match err {
            RecordError::InvalidFields(fields) => {
                assert_eq!(fields.get("title").map(String::as_str), Some("This field is required"));
                assert_eq!(fields.get("body").map(String::as_str), Some("This field is required"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = payload(json!({"title": "   ", "body": "x"})).into_new_record().unwrap_err();
        match err {
            RecordError::InvalidFields(fields) => {
                assert!(fields.contains_key("title"));
                assert!(!fields.contains_key("body"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn system_fields_are_rejected() {
        let err = RecordPayload::from_json(json!({"title": "A", "body": "x", "id": "abc"})).unwrap_err();
        assert!(matches!(err, RecordError::SystemFieldNotAllowed("id")));

        let err = RecordPayload::from_json(json!({"created_at": "2020-01-01T00:00:00Z"})).unwrap_err();
        assert!(matches!(err, RecordError::SystemFieldNotAllowed("created_at")));
    }

    #[test]
    fn wrong_types_are_invalid_json() {
        assert!(matches!(
            RecordPayload::from_json(json!({"title": 5, "body": "x"})),
            Err(RecordError::InvalidJson(_))
        ));
        assert!(matches!(
            RecordPayload::from_json(json!(["title"])),
            Err(RecordError::InvalidJson(_))
        ));
    }

    #[test]
    fn patch_keeps_omitted_fields() {
        let created = Utc::now();
        let mut record = NewRecord {
            title: "A".to_string(),
            body: "x".to_string(),
            tags: vec!["work".to_string()],
        }
        .into_record(created);
        let id = record.id;

        let patch = payload(json!({"title": "B"})).into_patch().unwrap();
        patch.apply(&mut record);

        assert_eq!(record.id, id);
        assert_eq!(record.created_at, created);
        assert_eq!(record.title, "B");
        assert_eq!(record.body, "x");
        assert_eq!(record.tags, vec!["work".to_string()]);
    }

    #[test]
    fn patch_can_clear_tags() {
        let patch = payload(json!({"tags": []})).into_patch().unwrap();
        assert_eq!(patch.tags, Some(vec![]));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(matches!(payload(json!({})).into_patch(), Err(RecordError::EmptyPatch)));
        assert!(matches!(
            payload(json!({"body": ""})).into_patch(),
            Err(RecordError::InvalidFields(_))
        ));
    }

    #[test]
    fn record_serializes_with_wire_field_names() {
        let record = NewRecord {
            title: "A".to_string(),
            body: "x".to_string(),
            tags: vec![],
        }
        .into_record(Utc::now());
        let value = serde_json::to_value(&record).unwrap();
        for key in ["id", "title", "body", "tags", "created_at"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["tags"], json!([]));
    }
}
