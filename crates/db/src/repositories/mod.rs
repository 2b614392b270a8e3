use async_trait::async_trait;
use thiserror::Error;

use rfqdesk_core::domain::quote::SupplierQuote;
use rfqdesk_core::domain::rfq::{Rfq, RfqId};

pub mod memory;

pub use memory::{InMemoryQuoteLedgerRepository, InMemoryRfqRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed registry of normalized RFQs. `save` replaces any record with the
/// same id as a whole.
#[async_trait]
pub trait RfqRepository: Send + Sync {
    async fn find_by_id(&self, id: &RfqId) -> Result<Option<Rfq>, RepositoryError>;
    async fn save(&self, rfq: Rfq) -> Result<(), RepositoryError>;
    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// Append-only quote lists keyed by RFQ id. Order of `append` calls is the
/// order `list` returns.
#[async_trait]
pub trait QuoteLedgerRepository: Send + Sync {
    /// Returns the ledger length for `rfq_id` after the append.
    async fn append(&self, rfq_id: &RfqId, quote: SupplierQuote)
        -> Result<usize, RepositoryError>;
    async fn list(&self, rfq_id: &RfqId) -> Result<Vec<SupplierQuote>, RepositoryError>;
    async fn total(&self) -> Result<usize, RepositoryError>;
}
