//! Deposit ledger bot.
//!
//! A Telegram bot over a per-user account ledger: users pick a plan, make a
//! deposit that is checked against a public block explorer, and earn a
//! plan-specific daily rate credited by a scheduled job. An administrator
//! can override balances, broadcast messages and view statistics.

pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
