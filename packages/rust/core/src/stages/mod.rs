//! Enrichment stages and the shared stage runner.
//!
//! A stage owns a set of target fields. [`run_stage`] decides whether the
//! stage may skip its external work, and applies the stage's output so
//! that non-target fields never change and known values are never erased.

mod company;
mod email;
mod oracle;
mod profile;
mod sparse;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument};

use leadenrich_shared::{EnrichmentRecord, Field, Result, ShortCircuit, ShortCircuitConfig};

pub use company::{company_detail, company_identification};
pub use email::{EmailDiscovery, email_query};
pub use oracle::OracleStage;
pub use profile::{profile_detail, profile_url_discovery};
pub use sparse::sparse_strategy;

/// Identifies a stage in logs, reports, and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    ProfileUrlDiscovery,
    ProfileDetail,
    SparseStrategy,
    CompanyIdentification,
    CompanyDetail,
    EmailDiscovery,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileUrlDiscovery => "profile-url-discovery",
            Self::ProfileDetail => "profile-detail",
            Self::SparseStrategy => "sparse-strategy",
            Self::CompanyIdentification => "company-identification",
            Self::CompanyDetail => "company-detail",
            Self::EmailDiscovery => "email-discovery",
        }
    }

    /// The configured short-circuit policy for this stage.
    pub fn policy(&self, config: &ShortCircuitConfig) -> ShortCircuit {
        match self {
            Self::ProfileUrlDiscovery => config.profile_url_discovery,
            Self::ProfileDetail => config.profile_detail,
            Self::SparseStrategy => config.sparse_strategy,
            Self::CompanyIdentification => config.company_identification,
            Self::CompanyDetail => config.company_detail,
            Self::EmailDiscovery => config.email_discovery,
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One enrichment step.
#[async_trait]
pub trait Stage: Send + Sync {
    fn id(&self) -> StageId;

    /// Fields this stage is allowed to fill.
    fn targets(&self) -> &[Field];

    /// Produce a candidate record. Only target fields of the result are kept.
    async fn enrich(&self, record: &EnrichmentRecord) -> Result<EnrichmentRecord>;
}

/// What happened when a stage ran.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutcome {
    pub stage: StageId,
    /// The stage short-circuited and made no external calls.
    pub skipped: bool,
    /// Target fields that went from absent to present.
    pub filled: Vec<Field>,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Whether a stage may skip under `policy`.
pub fn short_circuits(policy: ShortCircuit, targets: &[Field], record: &EnrichmentRecord) -> bool {
    match policy {
        ShortCircuit::TargetFields => record.all_present(targets),
        ShortCircuit::FullRecord => record.is_full(),
    }
}

/// Run `stage` on `record` under `policy`.
#[instrument(skip_all, fields(stage = %stage.id()))]
pub async fn run_stage(
    stage: &dyn Stage,
    policy: ShortCircuit,
    record: &EnrichmentRecord,
) -> Result<(EnrichmentRecord, StageOutcome)> {
    let start = Instant::now();

    if short_circuits(policy, stage.targets(), record) {
        debug!(?policy, "short-circuit, nothing to do");
        return Ok((
            record.clone(),
            StageOutcome {
                stage: stage.id(),
                skipped: true,
                filled: Vec::new(),
                elapsed: start.elapsed(),
            },
        ));
    }

    let output = stage.enrich(record).await?;
    let enriched = record.absorb(&output, stage.targets());
    let filled: Vec<Field> = stage
        .targets()
        .iter()
        .copied()
        .filter(|f| !record.present(*f) && enriched.present(*f))
        .collect();

    info!(filled = filled.len(), "stage complete");
    Ok((
        enriched,
        StageOutcome {
            stage: stage.id(),
            skipped: false,
            filled,
            elapsed: start.elapsed(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed record and counts invocations.
    struct Canned {
        targets: &'static [Field],
        output: EnrichmentRecord,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Stage for Canned {
        fn id(&self) -> StageId {
            StageId::ProfileDetail
        }
        fn targets(&self) -> &[Field] {
            self.targets
        }
        async fn enrich(&self, _record: &EnrichmentRecord) -> Result<EnrichmentRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    fn canned(targets: &'static [Field], output: EnrichmentRecord) -> Canned {
        Canned {
            targets,
            output,
            calls: AtomicUsize::new(0),
        }
    }

    fn full() -> EnrichmentRecord {
        Field::ALL
            .into_iter()
            .fold(EnrichmentRecord::default(), |r, f| r.with(f, format!("v-{f}")))
    }

    #[test]
    fn stage_ids_render_kebab_case() {
        assert_eq!(StageId::CompanyIdentification.to_string(), "company-identification");
        assert_eq!(
            serde_json::to_value(StageId::EmailDiscovery).unwrap(),
            serde_json::json!("email-discovery")
        );
    }

    #[test]
    fn default_policies_follow_stage_table() {
        let config = ShortCircuitConfig::default();
        assert_eq!(StageId::ProfileUrlDiscovery.policy(&config), ShortCircuit::TargetFields);
        assert_eq!(StageId::EmailDiscovery.policy(&config), ShortCircuit::TargetFields);
        for id in [
            StageId::ProfileDetail,
            StageId::SparseStrategy,
            StageId::CompanyIdentification,
            StageId::CompanyDetail,
        ] {
            assert_eq!(id.policy(&config), ShortCircuit::FullRecord, "{id}");
        }
    }

    #[tokio::test]
    async fn full_record_short_circuits_without_calls() {
        let stage = canned(&[Field::Title], EnrichmentRecord::default());
        for policy in [ShortCircuit::TargetFields, ShortCircuit::FullRecord] {
            let (out, outcome) = run_stage(&stage, policy, &full()).await.unwrap();
            assert_eq!(out, full());
            assert!(outcome.skipped);
        }
        assert_eq!(stage.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn target_policy_skips_when_targets_present() {
        let stage = canned(&[Field::Email], EnrichmentRecord::default());
        let record = EnrichmentRecord::default().with(Field::Email, "a@b.c");

        let (_, outcome) = run_stage(&stage, ShortCircuit::TargetFields, &record).await.unwrap();
        assert!(outcome.skipped);
        let (_, outcome) = run_stage(&stage, ShortCircuit::FullRecord, &record).await.unwrap();
        assert!(!outcome.skipped);
        assert_eq!(stage.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn output_cannot_touch_non_targets_or_erase_values() {
        let input = EnrichmentRecord::default()
            .with(Field::FullName, "Jane Doe")
            .with(Field::CompanyName, "Acme");
        // The stage answers with a blank company and an unrelated field.
        let output = EnrichmentRecord::default()
            .with(Field::CompanyName, "  ")
            .with(Field::CompanyDomain, "acme.com")
            .with(Field::Email, "leak@acme.com");
        let stage = canned(leadenrich_shared::COMPANY_FIELDS, output);

        let (out, outcome) = run_stage(&stage, ShortCircuit::FullRecord, &input).await.unwrap();
        assert_eq!(out.company_name.as_deref(), Some("Acme"));
        assert_eq!(out.company_domain.as_deref(), Some("acme.com"));
        assert_eq!(out.email, None);
        assert_eq!(out.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(outcome.filled, vec![Field::CompanyDomain]);
        for field in input.present_fields() {
            assert!(out.present(field), "{field} was erased");
        }
    }

    #[tokio::test]
    async fn outcome_serializes_elapsed_as_millis() {
        let stage = canned(&[Field::Title], EnrichmentRecord::default());
        let (_, outcome) = run_stage(&stage, ShortCircuit::FullRecord, &full()).await.unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json["elapsed_ms"].is_u64());
        assert_eq!(json["stage"], "profile-detail");
    }
}
