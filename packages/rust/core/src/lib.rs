//! Enrichment pipeline for person records.
//!
//! A record is routed on its anchor fields to the DirectPath or the
//! SparsePath, the path output is merged, and the shared tail stages fill
//! in company details and the email address. Stages delegate to the
//! oracle with capability tools bound, except email discovery, which
//! calls the email finder directly.

pub mod batch;
pub mod merge;
pub mod pipeline;
pub mod router;
pub mod stages;
pub mod tools;

#[cfg(test)]
mod testing;

pub use batch::{BatchProgress, BatchReport, enrich_batch};
pub use pipeline::{
    EnrichProgress, Gateways, Pipeline, PipelineOptions, PipelineStages, RunReport, SilentProgress,
};
pub use router::{Route, route};
pub use stages::{Stage, StageId, StageOutcome};
