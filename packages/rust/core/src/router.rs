//! Branch routing on anchor fields.

use serde::Serialize;

use leadenrich_shared::{EnrichError, EnrichmentRecord, Field, Result};

/// Which path a record takes through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Profile URL known, or both name and company known.
    Direct,
    /// No profile URL and exactly one of name / company.
    Sparse,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Sparse => "sparse",
        })
    }
}

pub fn is_direct(record: &EnrichmentRecord) -> bool {
    record.present(Field::ProfileUrl)
        || (record.present(Field::FullName) && record.present(Field::CompanyName))
}

pub fn is_sparse(record: &EnrichmentRecord) -> bool {
    !record.present(Field::ProfileUrl)
        && (record.present(Field::FullName) != record.present(Field::CompanyName))
}

/// Route a record. A record with no anchor at all is rejected.
pub fn route(record: &EnrichmentRecord) -> Result<Route> {
    if is_direct(record) {
        Ok(Route::Direct)
    } else if is_sparse(record) {
        Ok(Route::Sparse)
    } else {
        Err(EnrichError::NoAnchorData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every combination of the three anchors, with blanks standing in for
    /// absence half the time.
    fn anchor_combinations() -> Vec<EnrichmentRecord> {
        let mut records = Vec::new();
        for mask in 0u8..8 {
            for blank in [false, true] {
                let mut record = EnrichmentRecord::default().with(Field::Title, "CTO");
                let absent = if blank { Some("  ".to_string()) } else { None };
                let pick = |bit: u8, value: &str| {
                    if mask & bit != 0 {
                        Some(value.to_string())
                    } else {
                        absent.clone()
                    }
                };
                record.set(Field::ProfileUrl, pick(1, "https://example.com/in/x"));
                record.set(Field::FullName, pick(2, "Jane Doe"));
                record.set(Field::CompanyName, pick(4, "Acme"));
                records.push(record);
            }
        }
        records
    }

    #[test]
    fn routing_is_exclusive_and_total_over_anchors() {
        for record in anchor_combinations() {
            let direct = is_direct(&record);
            let sparse = is_sparse(&record);
            assert!(!(direct && sparse), "both paths for {record:?}");

            let anchored = record.present(Field::ProfileUrl)
                || record.present(Field::FullName)
                || record.present(Field::CompanyName);
            match route(&record) {
                Ok(Route::Direct) => assert!(direct),
                Ok(Route::Sparse) => assert!(sparse),
                Err(EnrichError::NoAnchorData) => assert!(!anchored, "{record:?}"),
                Err(other) => panic!("unexpected error {other}"),
            }
            assert_eq!(direct || sparse, anchored);
        }
    }

    #[test]
    fn scenarios() {
        let url_only = EnrichmentRecord::default().with(Field::ProfileUrl, "https://example.com/in/x");
        assert_eq!(route(&url_only).unwrap(), Route::Direct);

        let name_and_company = EnrichmentRecord::default()
            .with(Field::FullName, "Jane Doe")
            .with(Field::CompanyName, "Acme");
        assert_eq!(route(&name_and_company).unwrap(), Route::Direct);

        let company_only = EnrichmentRecord::default().with(Field::CompanyName, "Acme");
        assert_eq!(route(&company_only).unwrap(), Route::Sparse);

        let blank_name = EnrichmentRecord::default()
            .with(Field::FullName, " ")
            .with(Field::Email, "a@b.c");
        assert!(matches!(route(&blank_name), Err(EnrichError::NoAnchorData)));
    }
}
