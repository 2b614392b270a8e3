use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use rfqdesk_core::domain::quote::SupplierQuote;
use rfqdesk_core::domain::rfq::RfqId;
use rfqdesk_core::errors::ApplicationError;

use crate::repositories::{QuoteLedgerRepository, RepositoryError, RfqRepository};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("rfq `{0}` not found")]
    RfqNotFound(RfqId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<LedgerError> for ApplicationError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::RfqNotFound(id) => ApplicationError::not_found("rfq", id.0),
            LedgerError::Repository(error) => ApplicationError::Persistence(error.to_string()),
        }
    }
}

/// Supplier quote submissions for known RFQs.
#[derive(Clone)]
pub struct QuoteLedger {
    rfqs: Arc<dyn RfqRepository>,
    quotes: Arc<dyn QuoteLedgerRepository>,
}

impl QuoteLedger {
    pub fn new(rfqs: Arc<dyn RfqRepository>, quotes: Arc<dyn QuoteLedgerRepository>) -> Self {
        Self { rfqs, quotes }
    }

    pub async fn submit(&self, rfq_id: &RfqId, quote: SupplierQuote) -> Result<usize, LedgerError> {
        self.ensure_known(rfq_id).await?;
        let length = self.quotes.append(rfq_id, quote).await?;

        info!(
            event_name = "ledger.quote.appended",
            rfq_id = %rfq_id,
            ledger_length = length,
            "supplier quote appended"
        );
        Ok(length)
    }

    /// Empty when the RFQ exists but has no quotes yet.
    pub async fn list_quotes(&self, rfq_id: &RfqId) -> Result<Vec<SupplierQuote>, LedgerError> {
        self.ensure_known(rfq_id).await?;
        Ok(self.quotes.list(rfq_id).await?)
    }

    pub async fn total_quotes(&self) -> Result<usize, LedgerError> {
        Ok(self.quotes.total().await?)
    }

    async fn ensure_known(&self, rfq_id: &RfqId) -> Result<(), LedgerError> {
        match self.rfqs.find_by_id(rfq_id).await? {
            Some(_) => Ok(()),
            None => Err(LedgerError::RfqNotFound(rfq_id.clone())),
        }
    }
}
