//! The record shape the oracle must answer with, and its validation.

use serde_json::{Map, Value, json};

use leadenrich_shared::{
    EnrichError, EnrichmentRecord, Field, PROFILE_URL_ALIAS, Result, prefer_present,
};

/// Name under which the record schema is sent in structured mode.
pub const RECORD_SCHEMA_NAME: &str = "enrichment_record";

fn describe(field: Field) -> &'static str {
    match field {
        Field::FullName => "The person's full name",
        Field::FirstName => "The person's first name",
        Field::LastName => "The person's last name",
        Field::Title => "The person's current job title",
        Field::Email => "The person's professional email address",
        Field::ProfileUrl => "URL of the person's professional-network profile",
        Field::CompanyName => "Name of the person's current company",
        Field::CompanyDomain => "Primary web domain of the company, e.g. acme.com",
        Field::CompanyDescription => "One or two sentences describing the company",
    }
}

/// Strict JSON schema of [`EnrichmentRecord`]: every key required, each a
/// string or null, no extra keys.
pub fn record_schema() -> Value {
    let mut properties = Map::new();
    for field in Field::ALL {
        properties.insert(
            field.key().to_string(),
            json!({ "type": ["string", "null"], "description": describe(field) }),
        );
    }
    let required: Vec<&str> = Field::ALL.iter().map(Field::key).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// Plain-language description of the answer shape, appended to every
/// agent's instructions.
pub fn shape_instructions() -> String {
    let keys: Vec<&str> = Field::ALL.iter().map(Field::key).collect();
    format!(
        "Answer with a single JSON object and nothing else. It must have exactly these keys: {}. \
         Every value is a string or null. Use null for anything you could not determine; \
         never invent values.",
        keys.join(", ")
    )
}

/// Validate a decoded oracle answer and convert it into a record.
///
/// The value must be an object whose known keys hold strings or nulls.
/// Unknown keys are ignored. `raw` is the original text, kept for the
/// error excerpt.
pub fn validate_record(value: &Value, raw: &str) -> Result<EnrichmentRecord> {
    let Some(map) = value.as_object() else {
        return Err(EnrichError::malformed(
            "expected a JSON object for the record",
            raw,
        ));
    };

    let mut record = EnrichmentRecord::default();
    for field in Field::ALL {
        record.set(field, text_slot(map, field.key(), raw)?);
    }
    let alias = text_slot(map, PROFILE_URL_ALIAS, raw)?;
    record.profile_url = prefer_present(record.profile_url.take(), alias);
    Ok(record)
}

/// A key's value as text. Missing and null are none; anything other than
/// a string is malformed.
fn text_slot(map: &Map<String, Value>, key: &str, raw: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(EnrichError::malformed(
            format!("field {key} must be a string or null, got {other}"),
            raw,
        )),
    }
}
