//! Company stages: identify the employer, then describe it.

use std::sync::Arc;

use leadenrich_gateways::{ProfileDetail, ProfileSearch, WebSearch};
use leadenrich_oracle::{Agent, OracleAdapter};
use leadenrich_shared::{COMPANY_FIELDS, EnrichmentRecord, Field};

use super::StageId;
use super::oracle::{OracleStage, shown};
use crate::tools::{ProfileDetailTool, ProfileSearchTool, WebSearchTool};

const IDENTIFICATION_INSTRUCTIONS: &str = "\
You identify the company a person works for when their own details are too thin to find them directly.
Use the company name if known, otherwise look the person up first. Confirm the company's official \
website and report its name, primary domain and a short description.";

const DETAIL_INSTRUCTIONS: &str = "\
You enrich company details. Using web search, confirm the company's canonical name and its \
official domain, and write one or two factual sentences describing what it does.";

fn identification_task(record: &EnrichmentRecord) -> String {
    format!(
        "Identify the company associated with {} (company hint: {}).",
        shown(record, Field::FullName),
        shown(record, Field::CompanyName),
    )
}

fn detail_task(record: &EnrichmentRecord) -> String {
    format!(
        "Enrich the company details for {} (domain: {}).",
        shown(record, Field::CompanyName),
        shown(record, Field::CompanyDomain),
    )
}

/// `company-identification`: SparsePath's second step.
pub fn company_identification(
    oracle: Arc<OracleAdapter>,
    web: Arc<dyn WebSearch>,
    search: Arc<dyn ProfileSearch>,
    detail: Arc<dyn ProfileDetail>,
) -> OracleStage {
    let agent = Agent::new("company-identification", IDENTIFICATION_INSTRUCTIONS)
        .with_tool(Arc::new(WebSearchTool::new(web)))
        .with_tool(Arc::new(ProfileSearchTool::new(search)))
        .with_tool(Arc::new(ProfileDetailTool::new(detail)));
    OracleStage::new(
        StageId::CompanyIdentification,
        COMPANY_FIELDS,
        agent,
        identification_task,
        oracle,
    )
}

/// `company-detail`: runs on the merged record.
pub fn company_detail(oracle: Arc<OracleAdapter>, web: Arc<dyn WebSearch>) -> OracleStage {
    let agent = Agent::new("company-detail", DETAIL_INSTRUCTIONS)
        .with_tool(Arc::new(WebSearchTool::new(web)));
    OracleStage::new(
        StageId::CompanyDetail,
        COMPANY_FIELDS,
        agent,
        detail_task,
        oracle,
    )
}
