//! SparsePath entry: pick a search strategy when only one anchor is known.

use std::sync::Arc;

use leadenrich_gateways::{ProfileSearch, WebSearch};
use leadenrich_oracle::{Agent, OracleAdapter};
use leadenrich_shared::{EnrichmentRecord, Field};

use super::StageId;
use super::oracle::{OracleStage, shown};
use crate::tools::{ProfileSearchTool, WebSearchTool};

const ALL_FIELDS: &[Field] = &Field::ALL;

const INSTRUCTIONS: &str = "\
You work from sparse input: either a person's name without a company, or a company without a person.
First decide which search is more likely to succeed: a broad search for the person, or identifying \
the company first to give a later person search context. Then run that search with the tools and \
fill every field you can confirm. Leave the rest null.";

fn task(record: &EnrichmentRecord) -> String {
    format!(
        "Known name: {}. Known company: {}. Choose the most viable search strategy and enrich the record.",
        shown(record, Field::FullName),
        shown(record, Field::CompanyName),
    )
}

/// `sparse-strategy`: may fill any field.
pub fn sparse_strategy(
    oracle: Arc<OracleAdapter>,
    search: Arc<dyn ProfileSearch>,
    web: Arc<dyn WebSearch>,
) -> OracleStage {
    let agent = Agent::new("sparse-strategy", INSTRUCTIONS)
        .with_tool(Arc::new(ProfileSearchTool::new(search)))
        .with_tool(Arc::new(WebSearchTool::new(web)));
    OracleStage::new(StageId::SparseStrategy, ALL_FIELDS, agent, task, oracle)
}
