//! DirectPath stages: find the profile URL, then read the profile.

use std::sync::Arc;

use leadenrich_gateways::{ProfileDetail, ProfileSearch, WebSearch};
use leadenrich_oracle::{Agent, OracleAdapter};
use leadenrich_shared::{EnrichmentRecord, Field, PERSON_FIELDS};

use super::StageId;
use super::oracle::{OracleStage, shown};
use crate::tools::{ProfileDetailTool, ProfileSearchTool, WebSearchTool};

const PROFILE_URL: &[Field] = &[Field::ProfileUrl];

/// Site the discovery agent's web search is pinned to by default.
const PROFILE_SITE: &str = "linkedin.com";

const URL_DISCOVERY_INSTRUCTIONS: &str = "\
You find the professional-network profile URL of a person given their name and current company.
1. Search for the person with the available tools.
2. Compare each candidate's name and company with the record.
3. Keep a URL only when both match convincingly. Otherwise leave profile_url null.
Only profile_url is taken from your answer; return the other fields as they were given.";

const DETAIL_INSTRUCTIONS: &str = "\
You read a person's professional profile and extract who they are and where they work now.
Fetch the profile at the given URL. Fill the name parts, the current job title and the \
current employer. Use web search only to resolve contradictions.";

fn url_discovery_task(record: &EnrichmentRecord) -> String {
    format!(
        "Find the profile URL of {} who currently works at {}.",
        shown(record, Field::FullName),
        shown(record, Field::CompanyName),
    )
}

fn detail_task(record: &EnrichmentRecord) -> String {
    format!(
        "Read the profile at {} and fill in the person's details.",
        shown(record, Field::ProfileUrl)
    )
}

/// `profile-url-discovery`: fills `profile_url` from name and company.
pub fn profile_url_discovery(
    oracle: Arc<OracleAdapter>,
    search: Arc<dyn ProfileSearch>,
    web: Arc<dyn WebSearch>,
) -> OracleStage {
    let agent = Agent::new("profile-url-discovery", URL_DISCOVERY_INSTRUCTIONS)
        .with_tool(Arc::new(ProfileSearchTool::new(search)))
        .with_tool(Arc::new(WebSearchTool::new(web).on_site(PROFILE_SITE)));
    OracleStage::new(
        StageId::ProfileUrlDiscovery,
        PROFILE_URL,
        agent,
        url_discovery_task,
        oracle,
    )
}

/// `profile-detail`: fills the person fields from the profile URL.
pub fn profile_detail(
    oracle: Arc<OracleAdapter>,
    detail: Arc<dyn ProfileDetail>,
    web: Arc<dyn WebSearch>,
) -> OracleStage {
    let agent = Agent::new("profile-detail", DETAIL_INSTRUCTIONS)
        .with_tool(Arc::new(ProfileDetailTool::new(detail)))
        .with_tool(Arc::new(WebSearchTool::new(web)));
    OracleStage::new(
        StageId::ProfileDetail,
        PERSON_FIELDS,
        agent,
        detail_task,
        oracle,
    )
}
