use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

// === Lessons ===

/// Locates exactly one lesson, either by its generated `_id` or by the
/// numeric business `id` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonFilter {
    ObjectId(ObjectId),
    Numeric(i64),
}

impl LessonFilter {
    /// Generated identifiers take precedence; integers are tried second.
    pub fn parse(param: &str) -> Result<Self> {
        if let Ok(oid) = ObjectId::parse_str(param) {
            return Ok(Self::ObjectId(oid));
        }
        leading_integer(param)
            .map(Self::Numeric)
            .ok_or(AppError::InvalidLessonId)
    }

    pub fn to_document(&self) -> Document {
        match self {
            Self::ObjectId(oid) => doc! { "_id": *oid },
            Self::Numeric(id) => doc! { "id": *id },
        }
    }
}

/// Reads an optionally signed run of digits from the start of `param`,
/// ignoring leading whitespace and anything after the digits: `"12abc"` is 12
/// and `"1.5"` is 1. Values outside `i64` are rejected.
fn leading_integer(param: &str) -> Option<i64> {
    let s = param.trim_start();
    let sign = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign + digits].parse().ok()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Serialize)]
pub struct LessonUpdated {
    pub msg: &'static str,
    pub modified: u64,
}

// === Orders ===

/// A validated order whose line items live under `lessons` only.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    document: Document,
}

impl NewOrder {
    pub fn from_body(mut body: Map<String, Value>) -> Result<Self> {
        if !non_empty_string(body.get("name")) || !non_empty_string(body.get("phone")) {
            return Err(AppError::InvalidOrder);
        }

        let items = match (body.remove("lessons"), body.remove("cart")) {
            (Some(Value::Array(items)), _) | (_, Some(Value::Array(items))) => items,
            _ => return Err(AppError::InvalidOrder),
        };
        if items.is_empty() {
            return Err(AppError::InvalidOrder);
        }

        // The identifier is always generated server-side.
        body.remove("_id");
        body.insert("lessons".into(), Value::Array(items));
        Ok(Self {
            document: json_to_document(&body)?,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The stored form, with the generated `_id` leading like the driver
    /// would place it.
    pub fn into_document_with_id(self, id: ObjectId) -> Document {
        let mut document = doc! { "_id": id };
        document.extend(self.document);
        document
    }
}

fn non_empty_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.is_empty())
}

#[derive(Debug, Serialize)]
pub struct OrderSaved {
    pub message: &'static str,
    #[serde(rename = "orderId")]
    pub order_id: String,
}

// === Document shaping ===

/// Converts a client-supplied JSON object for storage. Values BSON cannot
/// hold, such as integers above `i64::MAX`, are a client error.
pub fn json_to_document(body: &Map<String, Value>) -> Result<Document> {
    bson::to_document(body).map_err(|err| {
        tracing::debug!(error = %err, "request body not storable");
        AppError::InvalidBody
    })
}

/// Renders a stored document as plain JSON: object ids become hex strings and
/// datetimes RFC 3339 strings.
pub fn document_to_json(doc: Document) -> Value {
    bson_to_json(Bson::Document(doc))
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        other => other.into_relaxed_extjson(),
    }
}

// === Errors ===

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
