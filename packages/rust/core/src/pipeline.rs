//! End-to-end enrichment: route → path stages → merge → company detail → email.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{Span, field, info, instrument};
use uuid::Uuid;

use leadenrich_gateways::{
    AnymailFinderClient, EmailFinder, FanoutProfileSearch, ProfileDetail, ProfileSearch,
    ScrapinClient, SerpApiClient, WebSearch,
};
use leadenrich_oracle::OracleAdapter;
use leadenrich_shared::{
    AppConfig, EnrichError, EnrichmentRecord, Field, PipelineConfig, Result, ShortCircuitConfig,
};

use crate::merge::{PathOutputs, merge};
use crate::router::{self, Route};
use crate::stages::{self, EmailDiscovery, Stage, StageId, StageOutcome, run_stage};

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// The external capabilities stages are built from.
#[derive(Clone)]
pub struct Gateways {
    pub profile_search: Arc<dyn ProfileSearch>,
    pub profile_detail: Arc<dyn ProfileDetail>,
    pub web_search: Arc<dyn WebSearch>,
    pub email_finder: Arc<dyn EmailFinder>,
}

impl Gateways {
    /// Real HTTP clients for every capability.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let scrapin = Arc::new(ScrapinClient::from_config(&config.profiles)?);
        let providers: Vec<Arc<dyn ProfileSearch>> = vec![scrapin.clone()];
        Ok(Self {
            profile_search: Arc::new(FanoutProfileSearch::new(providers)),
            profile_detail: scrapin,
            web_search: Arc::new(SerpApiClient::from_config(&config.search)?),
            email_finder: Arc::new(AnymailFinderClient::from_config(&config.email)?),
        })
    }
}

/// One instance of every stage, injected into the pipeline.
#[derive(Clone)]
pub struct PipelineStages {
    pub profile_url_discovery: Arc<dyn Stage>,
    pub profile_detail: Arc<dyn Stage>,
    pub sparse_strategy: Arc<dyn Stage>,
    pub company_identification: Arc<dyn Stage>,
    pub company_detail: Arc<dyn Stage>,
    pub email_discovery: Arc<dyn Stage>,
}

impl PipelineStages {
    /// Build the standard stages over one oracle and one set of gateways.
    pub fn build(oracle: Arc<OracleAdapter>, gateways: &Gateways) -> Self {
        let g = gateways;
        Self {
            profile_url_discovery: Arc::new(stages::profile_url_discovery(
                oracle.clone(),
                g.profile_search.clone(),
                g.web_search.clone(),
            )),
            profile_detail: Arc::new(stages::profile_detail(
                oracle.clone(),
                g.profile_detail.clone(),
                g.web_search.clone(),
            )),
            sparse_strategy: Arc::new(stages::sparse_strategy(
                oracle.clone(),
                g.profile_search.clone(),
                g.web_search.clone(),
            )),
            company_identification: Arc::new(stages::company_identification(
                oracle.clone(),
                g.web_search.clone(),
                g.profile_search.clone(),
                g.profile_detail.clone(),
            )),
            company_detail: Arc::new(stages::company_detail(oracle, g.web_search.clone())),
            email_discovery: Arc::new(EmailDiscovery::new(g.email_finder.clone())),
        }
    }
}

/// Run-time knobs.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Whole-run deadline. `None` runs to completion.
    pub deadline: Option<Duration>,
    pub short_circuit: ShortCircuitConfig,
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            deadline: (config.deadline_secs > 0).then(|| Duration::from_secs(config.deadline_secs)),
            short_circuit: config.short_circuit.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress and reports
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait EnrichProgress: Send + Sync {
    /// Called once the record is routed.
    fn routed(&self, route: Route);
    /// Called before a stage runs (or short-circuits).
    fn stage_started(&self, stage: StageId);
    /// Called after a stage returns successfully.
    fn stage_finished(&self, outcome: &StageOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl EnrichProgress for SilentProgress {
    fn routed(&self, _route: Route) {}
    fn stage_started(&self, _stage: StageId) {}
    fn stage_finished(&self, _outcome: &StageOutcome) {}
}

/// Result of one enrichment run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub route: Route,
    pub record: EnrichmentRecord,
    pub stages: Vec<StageOutcome>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    stages: PipelineStages,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(stages: PipelineStages, options: PipelineOptions) -> Self {
        Self { stages, options }
    }

    /// Wire the pipeline with real clients from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let oracle = Arc::new(OracleAdapter::from_config(&config.oracle)?);
        let gateways = Gateways::from_config(config)?;
        Ok(Self::new(
            PipelineStages::build(oracle, &gateways),
            PipelineOptions::from(&config.pipeline),
        ))
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Enrich a record.
    pub async fn run(&self, record: EnrichmentRecord) -> Result<EnrichmentRecord> {
        Ok(self.run_with_report(record, &SilentProgress).await?.record)
    }

    /// Normalize loosely-typed input, then enrich it.
    pub async fn run_value(&self, input: &Value) -> Result<EnrichmentRecord> {
        self.run(EnrichmentRecord::normalize(input)).await
    }

    /// Enrich a record and report the route and every stage outcome.
    ///
    /// The deadline, when set, covers the whole run. On expiry the
    /// in-flight call is dropped and [`EnrichError::DeadlineExceeded`] is
    /// returned.
    #[instrument(skip_all, fields(run_id = field::Empty, route = field::Empty))]
    pub async fn run_with_report(
        &self,
        record: EnrichmentRecord,
        progress: &dyn EnrichProgress,
    ) -> Result<RunReport> {
        let run_id = Uuid::now_v7();
        Span::current().record("run_id", field::display(run_id));
        info!(present = record.present_fields().len(), "starting enrichment run");

        let work = self.execute(record, progress);
        let (route, record, stages) = match self.options.deadline {
            Some(after) => tokio::time::timeout(after, work)
                .await
                .map_err(|_| EnrichError::DeadlineExceeded { after })??,
            None => work.await?,
        };

        let missing = record.missing_fields();
        info!(
            present = Field::ALL.len() - missing.len(),
            ?missing,
            "enrichment run complete"
        );
        Ok(RunReport {
            run_id,
            route,
            record,
            stages,
        })
    }

    async fn execute(
        &self,
        record: EnrichmentRecord,
        progress: &dyn EnrichProgress,
    ) -> Result<(Route, EnrichmentRecord, Vec<StageOutcome>)> {
        let route = router::route(&record)?;
        Span::current().record("route", field::display(route));
        progress.routed(route);

        let mut outcomes = Vec::new();
        let paths = match route {
            Route::Direct => {
                let r = self
                    .step(&self.stages.profile_url_discovery, &record, progress, &mut outcomes)
                    .await?;
                let r = self
                    .step(&self.stages.profile_detail, &r, progress, &mut outcomes)
                    .await?;
                PathOutputs {
                    direct: Some(r),
                    sparse: None,
                }
            }
            Route::Sparse => {
                let r = self
                    .step(&self.stages.sparse_strategy, &record, progress, &mut outcomes)
                    .await?;
                let r = self
                    .step(&self.stages.company_identification, &r, progress, &mut outcomes)
                    .await?;
                PathOutputs {
                    direct: None,
                    sparse: Some(r),
                }
            }
        };

        let merged = merge(&paths);
        let r = self
            .step(&self.stages.company_detail, &merged, progress, &mut outcomes)
            .await?;
        let r = self
            .step(&self.stages.email_discovery, &r, progress, &mut outcomes)
            .await?;
        Ok((route, r, outcomes))
    }

    async fn step(
        &self,
        stage: &Arc<dyn Stage>,
        record: &EnrichmentRecord,
        progress: &dyn EnrichProgress,
        outcomes: &mut Vec<StageOutcome>,
    ) -> Result<EnrichmentRecord> {
        let policy = stage.id().policy(&self.options.short_circuit);
        progress.stage_started(stage.id());
        let (record, outcome) = run_stage(stage.as_ref(), policy, record).await?;
        progress.stage_finished(&outcome);
        outcomes.push(outcome);
        Ok(record)
    }
}
