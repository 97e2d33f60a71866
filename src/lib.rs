pub mod config;
pub mod export;
pub mod humanize;
pub mod ledger;
pub mod observability;
pub mod worker;
