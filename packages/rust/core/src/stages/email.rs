//! Email discovery. Calls the email finder directly; no oracle involved.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use leadenrich_gateways::{EmailFinder, EmailQuery};
use leadenrich_shared::{EnrichmentRecord, Field, Result};

use super::{Stage, StageId};

const EMAIL: &[Field] = &[Field::Email];

/// Pick the most specific email query the record supports.
///
/// Name parts with a domain beat a full name with a domain, which beats a
/// bare profile URL. `None` means there is nothing to query with.
pub fn email_query(record: &EnrichmentRecord) -> Option<EmailQuery> {
    let value = |field: Field| {
        record
            .get(field)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };

    let domain = value(Field::CompanyDomain);
    if let (Some(first), Some(last), Some(domain)) =
        (value(Field::FirstName), value(Field::LastName), domain.clone())
    {
        return Some(EmailQuery::ByName {
            first,
            last,
            domain,
        });
    }
    if let (Some(full_name), Some(domain)) = (value(Field::FullName), domain) {
        return Some(EmailQuery::ByFullName { full_name, domain });
    }
    value(Field::ProfileUrl).map(|profile_url| EmailQuery::ByProfileUrl { profile_url })
}

/// `email-discovery`: fills `email`.
pub struct EmailDiscovery {
    finder: Arc<dyn EmailFinder>,
}

impl EmailDiscovery {
    pub fn new(finder: Arc<dyn EmailFinder>) -> Self {
        Self { finder }
    }
}

#[async_trait]
impl Stage for EmailDiscovery {
    fn id(&self) -> StageId {
        StageId::EmailDiscovery
    }

    fn targets(&self) -> &[Field] {
        EMAIL
    }

    async fn enrich(&self, record: &EnrichmentRecord) -> Result<EnrichmentRecord> {
        let Some(query) = email_query(record) else {
            info!("no name, domain or profile URL to look an email up with");
            return Ok(record.clone());
        };

        match self.finder.find(&query).await {
            Ok(candidate) => Ok(record.clone().with(Field::Email, candidate.email)),
            Err(e) if e.is_not_found() => {
                debug!(error = %e, "no email found");
                Ok(record.clone())
            }
            Err(e) => Err(e.into()),
        }
    }
}
