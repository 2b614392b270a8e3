pub mod conversation;
pub mod quote;
pub mod rfq;
