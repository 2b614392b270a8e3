pub mod ledger;
pub mod repositories;

pub use ledger::{LedgerError, QuoteLedger};
pub use repositories::{
    InMemoryQuoteLedgerRepository, InMemoryRfqRepository, QuoteLedgerRepository, RepositoryError,
    RfqRepository,
};
