//! Business logic services.
//!
//! Services contain the logic behind the bot's handlers, separated from
//! Telegram and HTTP plumbing.

pub mod account_service;
pub mod accrual;
pub mod scheduler;
pub mod verification;
