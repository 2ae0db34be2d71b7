//! Title refinement: long product titles into short search queries.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use leadenrich_oracle::OracleAdapter;
use leadenrich_shared::{EnrichError, Result};

const SCHEMA_NAME: &str = "refined_title";

const INSTRUCTIONS: &str = "\
You optimize titles for search. Take a verbose or lengthy title and turn it into a concise, \
search-engine-friendly query. Keep the key information (brand, product type, distinguishing \
specs) and drop filler words.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Refined {
    refined_title: String,
}

fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "refinedTitle": {
                "type": "string",
                "description": "The refined, search-optimized title"
            }
        },
        "required": ["refinedTitle"],
        "additionalProperties": false,
    })
}

/// Ask the oracle for a concise search query for `title`.
#[instrument(skip_all, fields(chars = title.chars().count()))]
pub async fn refine_title(oracle: &OracleAdapter, title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(EnrichError::validation("title must not be empty"));
    }

    let answer: Refined = oracle
        .complete_json(INSTRUCTIONS, &format!("The title is: {title}"), SCHEMA_NAME, schema())
        .await?;

    let refined = answer.refined_title.trim().to_string();
    if refined.is_empty() {
        return Err(EnrichError::malformed("refined title is empty", &answer.refined_title));
    }
    debug!(%refined, "title refined");
    Ok(refined)
}
