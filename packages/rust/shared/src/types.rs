//! The enrichment record: a partially filled description of a person and
//! their company.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// One of the nine semantic fields of an [`EnrichmentRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    FirstName,
    LastName,
    Title,
    Email,
    ProfileUrl,
    CompanyName,
    CompanyDomain,
    CompanyDescription,
}

impl Field {
    /// Every field, in serialization order.
    pub const ALL: [Field; 9] = [
        Field::FullName,
        Field::FirstName,
        Field::LastName,
        Field::Title,
        Field::Email,
        Field::ProfileUrl,
        Field::CompanyName,
        Field::CompanyDomain,
        Field::CompanyDescription,
    ];

    /// Serialized key of this field.
    pub fn key(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Title => "title",
            Self::Email => "email",
            Self::ProfileUrl => "profile_url",
            Self::CompanyName => "company_name",
            Self::CompanyDomain => "company_domain",
            Self::CompanyDescription => "company_description",
        }
    }

    /// Look a field up by key. Accepts `linkedin_url` for [`Field::ProfileUrl`].
    pub fn from_key(key: &str) -> Option<Self> {
        if key == PROFILE_URL_ALIAS {
            return Some(Self::ProfileUrl);
        }
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Fields read from a person's profile (the current employer included).
pub const PERSON_FIELDS: &[Field] = &[
    Field::FullName,
    Field::FirstName,
    Field::LastName,
    Field::Title,
    Field::ProfileUrl,
    Field::CompanyName,
];

/// Company context fields.
pub const COMPANY_FIELDS: &[Field] = &[
    Field::CompanyName,
    Field::CompanyDomain,
    Field::CompanyDescription,
];

/// `true` iff the value exists and its trimmed form is non-empty.
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Input key accepted in place of `profile_url`.
pub const PROFILE_URL_ALIAS: &str = "linkedin_url";

/// Strings verbatim, numbers and booleans stringified, anything else none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// EnrichmentRecord
// ---------------------------------------------------------------------------

/// A person record flowing through the pipeline. Every field is optional;
/// blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordFields")]
pub struct EnrichmentRecord {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_domain: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
}

/// Wire form accepted on input: the record keys plus the `linkedin_url`
/// alias, which may appear next to `profile_url`.
#[derive(Deserialize)]
struct RecordFields {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    profile_url: Option<String>,
    #[serde(default)]
    linkedin_url: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    company_domain: Option<String>,
    #[serde(default)]
    company_description: Option<String>,
}

impl From<RecordFields> for EnrichmentRecord {
    fn from(raw: RecordFields) -> Self {
        Self {
            full_name: raw.full_name,
            first_name: raw.first_name,
            last_name: raw.last_name,
            title: raw.title,
            email: raw.email,
            profile_url: prefer_present(raw.profile_url, raw.linkedin_url),
            company_name: raw.company_name,
            company_domain: raw.company_domain,
            company_description: raw.company_description,
        }
    }
}

/// The canonical value unless it is absent or blank and the alias is present.
pub fn prefer_present(canonical: Option<String>, alias: Option<String>) -> Option<String> {
    if !is_present(canonical.as_deref()) && is_present(alias.as_deref()) {
        alias
    } else {
        canonical
    }
}

impl EnrichmentRecord {
    /// Merge caller input over the all-absent skeleton.
    ///
    /// Strings are kept verbatim, numbers and booleans are stringified,
    /// and everything else (null, arrays, objects, unknown keys) is
    /// ignored. Non-object input yields the empty record. `linkedin_url`
    /// fills `profile_url` only when the latter is not present.
    pub fn normalize(input: &Value) -> Self {
        let mut record = Self::default();
        let Some(map) = input.as_object() else {
            return record;
        };

        for field in Field::ALL {
            if let Some(text) = map.get(field.key()).and_then(scalar_text) {
                record.set(field, Some(text));
            }
        }
        let alias = map.get(PROFILE_URL_ALIAS).and_then(scalar_text);
        record.profile_url = prefer_present(record.profile_url.take(), alias);
        record
    }

    /// Raw value of a field.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::FullName => self.full_name.as_deref(),
            Field::FirstName => self.first_name.as_deref(),
            Field::LastName => self.last_name.as_deref(),
            Field::Title => self.title.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::ProfileUrl => self.profile_url.as_deref(),
            Field::CompanyName => self.company_name.as_deref(),
            Field::CompanyDomain => self.company_domain.as_deref(),
            Field::CompanyDescription => self.company_description.as_deref(),
        }
    }

    /// Replace the value of a field.
    pub fn set(&mut self, field: Field, value: Option<String>) {
        let slot = match field {
            Field::FullName => &mut self.full_name,
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Title => &mut self.title,
            Field::Email => &mut self.email,
            Field::ProfileUrl => &mut self.profile_url,
            Field::CompanyName => &mut self.company_name,
            Field::CompanyDomain => &mut self.company_domain,
            Field::CompanyDescription => &mut self.company_description,
        };
        *slot = value;
    }

    /// Builder-style setter, mostly for tests and call sites with literals.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Whether `field` holds a non-blank value.
    pub fn present(&self, field: Field) -> bool {
        is_present(self.get(field))
    }

    /// Whether every field in `fields` is present.
    pub fn all_present(&self, fields: &[Field]) -> bool {
        fields.iter().all(|f| self.present(*f))
    }

    /// A record is full iff every field is present. Never cached.
    pub fn is_full(&self) -> bool {
        self.all_present(&Field::ALL)
    }

    /// Fields currently present.
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| self.present(*f)).collect()
    }

    /// Fields currently absent or blank.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| !self.present(*f)).collect()
    }

    /// Apply a stage's output to this record.
    ///
    /// Target fields take `output`'s value when it is present and keep
    /// their current value otherwise. Non-target fields are left as is.
    pub fn absorb(&self, output: &EnrichmentRecord, targets: &[Field]) -> EnrichmentRecord {
        let mut next = self.clone();
        for field in targets {
            if output.present(*field) {
                next.set(*field, output.get(*field).map(str::to_owned));
            }
        }
        next
    }

    /// Fill fields absent here with present values from `other`.
    /// Present values in `self` are never overwritten.
    pub fn fill_gaps(&self, other: &EnrichmentRecord) -> EnrichmentRecord {
        let mut next = self.clone();
        for field in Field::ALL {
            if !self.present(field) && other.present(field) {
                next.set(field, other.get(field).map(str::to_owned));
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> EnrichmentRecord {
        EnrichmentRecord::default()
            .with(Field::FullName, "Jane Doe")
            .with(Field::FirstName, "Jane")
            .with(Field::LastName, "Doe")
            .with(Field::Title, "CTO")
            .with(Field::Email, "jane@acme.com")
            .with(Field::ProfileUrl, "https://example.com/in/jdoe")
            .with(Field::CompanyName, "Acme")
            .with(Field::CompanyDomain, "acme.com")
            .with(Field::CompanyDescription, "Anvils and more")
    }

    #[test]
    fn blank_strings_are_not_present() {
        assert!(!is_present(None));
        assert!(!is_present(Some("")));
        assert!(!is_present(Some("   \t")));
        assert!(is_present(Some(" x ")));
    }

    #[test]
    fn is_full_requires_every_field() {
        let record = full_record();
        assert!(record.is_full());

        for field in Field::ALL {
            let mut partial = record.clone();
            partial.set(field, Some("  ".into()));
            assert!(!partial.is_full(), "{field} blank should not be full");
            partial.set(field, None);
            assert!(!partial.is_full(), "{field} absent should not be full");
        }
    }

    #[test]
    fn normalize_merges_over_empty_skeleton() {
        let input = json!({
            "full_name": "Jane Doe",
            "company_name": null,
            "title": 42,
            "unknown": "ignored",
            "email": ["not", "text"],
        });
        let record = EnrichmentRecord::normalize(&input);
        assert_eq!(record.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.title.as_deref(), Some("42"));
        assert_eq!(record.company_name, None);
        assert_eq!(record.email, None);
        assert_eq!(record.present_fields(), vec![Field::FullName, Field::Title]);
        assert_eq!(record.missing_fields().len(), Field::ALL.len() - 2);
        assert!(!record.missing_fields().contains(&Field::Title));
    }

    #[test]
    fn normalize_non_object_is_empty() {
        assert_eq!(EnrichmentRecord::normalize(&json!("hi")), EnrichmentRecord::default());
        assert_eq!(EnrichmentRecord::normalize(&Value::Null), EnrichmentRecord::default());
    }

    #[test]
    fn normalize_accepts_linkedin_alias() {
        let record = EnrichmentRecord::normalize(&json!({"linkedin_url": "https://x/in/a"}));
        assert_eq!(record.profile_url.as_deref(), Some("https://x/in/a"));

        let both = EnrichmentRecord::normalize(&json!({
            "linkedin_url": "https://x/in/old",
            "profile_url": "https://x/in/new",
        }));
        assert_eq!(both.profile_url.as_deref(), Some("https://x/in/new"));
    }

    #[test]
    fn normalize_uses_alias_when_profile_url_is_null_or_blank() {
        let null = EnrichmentRecord::normalize(&json!({
            "full_name": null,
            "profile_url": null,
            "linkedin_url": "https://x/in/a",
        }));
        assert_eq!(null.profile_url.as_deref(), Some("https://x/in/a"));

        let blank = EnrichmentRecord::normalize(&json!({
            "profile_url": "  ",
            "linkedin_url": "https://x/in/a",
        }));
        assert_eq!(blank.profile_url.as_deref(), Some("https://x/in/a"));
    }

    #[test]
    fn deserialize_accepts_both_profile_keys() {
        let parsed: EnrichmentRecord = serde_json::from_str(
            r#"{"profile_url": null, "linkedin_url": "https://x/in/a"}"#,
        )
        .unwrap();
        assert_eq!(parsed.profile_url.as_deref(), Some("https://x/in/a"));

        let parsed: EnrichmentRecord = serde_json::from_str(
            r#"{"profile_url": "https://x/in/new", "linkedin_url": "https://x/in/old"}"#,
        )
        .unwrap();
        assert_eq!(parsed.profile_url.as_deref(), Some("https://x/in/new"));
    }

    #[test]
    fn serde_uses_spec_field_names() {
        let json = serde_json::to_value(full_record()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for field in Field::ALL {
            assert!(keys.contains(&field.key()), "missing key {}", field.key());
        }

        let parsed: EnrichmentRecord =
            serde_json::from_str(r#"{"linkedin_url":"https://x/in/a"}"#).unwrap();
        assert_eq!(parsed.profile_url.as_deref(), Some("https://x/in/a"));
    }

    #[test]
    fn absorb_only_touches_targets_and_never_erases() {
        let input = EnrichmentRecord::default()
            .with(Field::FullName, "Jane Doe")
            .with(Field::CompanyName, "Acme");
        let output = EnrichmentRecord::default()
            .with(Field::FullName, "Somebody Else")
            .with(Field::ProfileUrl, "https://example.com/in/jdoe")
            .with(Field::CompanyName, "");

        let next = input.absorb(&output, &[Field::ProfileUrl, Field::CompanyName]);
        assert_eq!(next.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(next.company_name.as_deref(), Some("Acme"));
        assert_eq!(next.profile_url.as_deref(), Some("https://example.com/in/jdoe"));
    }

    #[test]
    fn fill_gaps_keeps_existing_values() {
        let base = EnrichmentRecord::default()
            .with(Field::Title, "CTO")
            .with(Field::Email, " ");
        let other = EnrichmentRecord::default()
            .with(Field::Title, "Intern")
            .with(Field::Email, "jane@acme.com");

        let merged = base.fill_gaps(&other);
        assert_eq!(merged.title.as_deref(), Some("CTO"));
        assert_eq!(merged.email.as_deref(), Some("jane@acme.com"));
    }

    #[test]
    fn field_keys_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("nope"), None);
    }
}
