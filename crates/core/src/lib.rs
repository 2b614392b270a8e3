pub mod compat;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lenient;

pub use compat::{rfq_from_client, LineItemDraft};
pub use domain::conversation::{ChatRole, ChatTurn};
pub use domain::quote::SupplierQuote;
pub use domain::rfq::{
    resolve_project_name, CommercialTerms, LineItem, Measurement, Rfq, RfqId, Size, SourceKind,
    SourceRef, UNTITLED_PROJECT,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
