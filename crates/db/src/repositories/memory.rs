use std::collections::HashMap;

use tokio::sync::RwLock;

use rfqdesk_core::domain::quote::SupplierQuote;
use rfqdesk_core::domain::rfq::{Rfq, RfqId};

use super::{QuoteLedgerRepository, RepositoryError, RfqRepository};

#[derive(Default)]
pub struct InMemoryRfqRepository {
    rfqs: RwLock<HashMap<String, Rfq>>,
}

#[async_trait::async_trait]
impl RfqRepository for InMemoryRfqRepository {
    async fn find_by_id(&self, id: &RfqId) -> Result<Option<Rfq>, RepositoryError> {
        let rfqs = self.rfqs.read().await;
        Ok(rfqs.get(id.as_str()).cloned())
    }

    async fn save(&self, rfq: Rfq) -> Result<(), RepositoryError> {
        let mut rfqs = self.rfqs.write().await;
        rfqs.insert(rfq.id.0.clone(), rfq);
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.rfqs.read().await.len())
    }
}

#[derive(Default)]
pub struct InMemoryQuoteLedgerRepository {
    quotes: RwLock<HashMap<String, Vec<SupplierQuote>>>,
}

#[async_trait::async_trait]
impl QuoteLedgerRepository for InMemoryQuoteLedgerRepository {
    async fn append(
        &self,
        rfq_id: &RfqId,
        quote: SupplierQuote,
    ) -> Result<usize, RepositoryError> {
        let mut quotes = self.quotes.write().await;
        let entry = quotes.entry(rfq_id.0.clone()).or_default();
        entry.push(quote);
        Ok(entry.len())
    }

    async fn list(&self, rfq_id: &RfqId) -> Result<Vec<SupplierQuote>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.get(rfq_id.as_str()).cloned().unwrap_or_default())
    }

    async fn total(&self) -> Result<usize, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.values().map(Vec::len).sum())
    }
}
