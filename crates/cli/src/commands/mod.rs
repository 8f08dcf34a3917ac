pub mod account;
pub mod stats;
pub mod transfer;
