//! Data models.
//!
//! `account` maps to the single database table; `plan` is catalog data.

/// Per-user account ledger model
pub mod account;
/// Plan tiers loaded from the catalog
pub mod plan;
