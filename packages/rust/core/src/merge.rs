//! Merge of the path outputs before the shared tail stages.

use leadenrich_shared::EnrichmentRecord;

/// What each path produced. At most one is set for a routed record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOutputs {
    pub direct: Option<EnrichmentRecord>,
    pub sparse: Option<EnrichmentRecord>,
}

/// Combine path outputs. DirectPath values win, SparsePath fills the gaps,
/// and anything neither path knows stays absent.
pub fn merge(paths: &PathOutputs) -> EnrichmentRecord {
    let base = paths.direct.clone().unwrap_or_default();
    match &paths.sparse {
        Some(sparse) => base.fill_gaps(sparse),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadenrich_shared::Field;

    #[test]
    fn direct_wins_sparse_fills_gaps() {
        let direct = EnrichmentRecord::default()
            .with(Field::FullName, "Jane Doe")
            .with(Field::Title, "CTO");
        let sparse = EnrichmentRecord::default()
            .with(Field::FullName, "J. Doe")
            .with(Field::CompanyDomain, "acme.com")
            .with(Field::Title, "  ");

        let merged = merge(&PathOutputs {
            direct: Some(direct),
            sparse: Some(sparse),
        });
        assert_eq!(merged.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(merged.title.as_deref(), Some("CTO"));
        assert_eq!(merged.company_domain.as_deref(), Some("acme.com"));
        assert_eq!(merged.email, None);
    }

    #[test]
    fn single_path_passes_through() {
        let sparse = EnrichmentRecord::default().with(Field::CompanyName, "Acme");
        let merged = merge(&PathOutputs {
            direct: None,
            sparse: Some(sparse.clone()),
        });
        assert_eq!(merged, sparse);

        assert_eq!(merge(&PathOutputs::default()), EnrichmentRecord::default());
    }
}
