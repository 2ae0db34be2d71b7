//! Stages that delegate to the oracle with a fixed agent and task.

use std::sync::Arc;

use async_trait::async_trait;

use leadenrich_oracle::{Agent, OracleAdapter};
use leadenrich_shared::{EnrichmentRecord, Field, Result};

use super::{Stage, StageId};

/// Builds the task prompt from the current record.
pub type TaskFn = fn(&EnrichmentRecord) -> String;

/// An oracle-backed stage: one agent, one task template.
pub struct OracleStage {
    id: StageId,
    targets: &'static [Field],
    agent: Agent,
    task: TaskFn,
    oracle: Arc<OracleAdapter>,
}

impl OracleStage {
    pub fn new(
        id: StageId,
        targets: &'static [Field],
        agent: Agent,
        task: TaskFn,
        oracle: Arc<OracleAdapter>,
    ) -> Self {
        Self {
            id,
            targets,
            agent,
            task,
            oracle,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

#[async_trait]
impl Stage for OracleStage {
    fn id(&self) -> StageId {
        self.id
    }

    fn targets(&self) -> &[Field] {
        self.targets
    }

    async fn enrich(&self, record: &EnrichmentRecord) -> Result<EnrichmentRecord> {
        let task = (self.task)(record);
        self.oracle.interpret(&self.agent, &task, record).await
    }
}

/// Value of `field` for prompts, or a placeholder.
pub(crate) fn shown(record: &EnrichmentRecord, field: Field) -> &str {
    record
        .get(field)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("(unknown)")
}
