//! Firestore REST wire types and the report <-> document field mapping.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::features::reports::models::{NewReport, Report, ReportStatus};

pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_RESOLVED_AT: &str = "resolvedAt";

/// `setToServerValue` sentinel for the commit time
const REQUEST_TIME: &str = "REQUEST_TIME";

/// A document as returned by `GET .../documents/{collection}`
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDocument {
    /// Full resource name, ending in `/{collection}/{id}`
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    pub next_page_token: Option<String>,
}

/// Body of `documents:commit`
#[derive(Debug, Serialize)]
pub struct CommitRequest {
    pub writes: Vec<Write>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    pub update: WriteDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMask>,
    pub update_transforms: Vec<FieldTransform>,
    pub current_document: Precondition,
}

#[derive(Debug, Serialize)]
pub struct WriteDocument {
    pub name: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    pub field_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTransform {
    pub field_path: String,
    pub set_to_server_value: &'static str,
}

impl FieldTransform {
    pub fn server_time(field_path: &str) -> Self {
        Self {
            field_path: field_path.to_string(),
            set_to_server_value: REQUEST_TIME,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Precondition {
    pub exists: bool,
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn string_field(fields: &HashMap<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(String::from)
}

/// Anything other than a parsable `timestampValue` reads as absent
fn timestamp_field(fields: &HashMap<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(key)?.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

impl FirestoreDocument {
    /// Last path segment of the resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn to_report(&self) -> Result<Report, String> {
        let required = |key: &str| {
            string_field(&self.fields, key)
                .ok_or_else(|| format!("document {} has no string field '{}'", self.id(), key))
        };

        let status = required(FIELD_STATUS)?
            .parse::<ReportStatus>()
            .map_err(|e| format!("document {}: {}", self.id(), e))?;

        Ok(Report {
            id: self.id().to_string(),
            description: required(FIELD_DESCRIPTION)?,
            location: required(FIELD_LOCATION)?,
            category: required(FIELD_CATEGORY)?,
            status,
            created_at: timestamp_field(&self.fields, FIELD_CREATED_AT),
            resolved_at: timestamp_field(&self.fields, FIELD_RESOLVED_AT),
        })
    }
}

/// Field map for a new report; `createdAt` is added by a server transform
pub fn new_report_fields(report: &NewReport) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        FIELD_DESCRIPTION.to_string(),
        string_value(&report.description),
    );
    fields.insert(FIELD_LOCATION.to_string(), string_value(&report.location));
    fields.insert(FIELD_CATEGORY.to_string(), string_value(&report.category));
    fields.insert(
        FIELD_STATUS.to_string(),
        string_value(report.status.as_str()),
    );
    fields
}

/// Field map for the resolve patch; `resolvedAt` is added by a server transform
pub fn resolve_fields() -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        FIELD_STATUS.to_string(),
        string_value(ReportStatus::Resolved.as_str()),
    );
    fields
}
