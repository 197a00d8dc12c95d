//! Account data model and the value types stored on it.
//!
//! This module defines:
//! - `Account`: Database entity, one per chat user
//! - `Currency` / `UsdtNetwork`: settlement currency and stable-asset sub-network
//! - `DepositorDetails` / `DepositRecord`: values written by the deposit dialog
//! - Amount helpers: parsing user input and rounding for display

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Represents an account record from the database.
///
/// # Database Table
///
/// Maps to the `accounts` table, keyed by the Telegram user id.
///
/// # Balance Storage
///
/// Deposit and profit are exact decimals (`NUMERIC` columns). Accrual keeps
/// every digit; amounts are rounded to cents only when shown. Both are kept
/// non-negative by CHECK constraints.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    /// Telegram user id, immutable once created
    pub telegram_id: i64,

    pub full_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,

    /// Catalog plan key; always one of the configured plans when set
    pub selected_plan: Option<String>,

    /// Settlement currency code (see [`Currency`])
    pub selected_currency: Option<String>,

    /// Sub-network code for USDT deposits (see [`UsdtNetwork`])
    pub usdt_network: Option<String>,

    /// Last claimed transaction id
    pub txid: Option<String>,

    /// Principal in dollars
    pub deposit: Decimal,

    /// Accrued profit in dollars
    pub profit: Decimal,

    /// Payout address
    pub wallet_address: Option<String>,

    /// Two-letter display language
    pub language: String,

    /// Whether accrued profit is folded back into the principal
    pub compound: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// A fresh, empty account as it is created on first write.
    pub fn new(telegram_id: i64) -> Self {
        let now = Utc::now();
        Self {
            telegram_id,
            full_name: None,
            email: None,
            country: None,
            selected_plan: None,
            selected_currency: None,
            usdt_network: None,
            txid: None,
            deposit: Decimal::ZERO,
            profit: Decimal::ZERO,
            wallet_address: None,
            language: "en".to_string(),
            compound: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn currency(&self) -> Option<Currency> {
        self.selected_currency.as_deref()?.parse().ok()
    }

    pub fn network(&self) -> Option<UsdtNetwork> {
        self.usdt_network.as_deref()?.parse().ok()
    }

    pub fn total(&self) -> Decimal {
        self.deposit.saturating_add(self.profit)
    }
}

/// Currencies a deposit can be made in, plus the chain coins that only
/// appear as the settlement chain of a USDT sub-network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Btc,
    Eth,
    Bnb,
    Sol,
    Xrp,
    Trx,
    Ton,
    Usdt,
}

impl Currency {
    /// Currencies offered in the payment menu, in display order.
    pub const PAYMENT_OPTIONS: [Currency; 6] = [
        Currency::Btc,
        Currency::Eth,
        Currency::Usdt,
        Currency::Bnb,
        Currency::Sol,
        Currency::Xrp,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Btc => "BTC",
            Currency::Eth => "ETH",
            Currency::Bnb => "BNB",
            Currency::Sol => "SOL",
            Currency::Xrp => "XRP",
            Currency::Trx => "TRX",
            Currency::Ton => "TON",
            Currency::Usdt => "USDT",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown code `{0}`")]
pub struct UnknownCode(pub String);

impl FromStr for Currency {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BTC" => Ok(Currency::Btc),
            "ETH" => Ok(Currency::Eth),
            "BNB" => Ok(Currency::Bnb),
            "SOL" => Ok(Currency::Sol),
            "XRP" => Ok(Currency::Xrp),
            "TRX" => Ok(Currency::Trx),
            "TON" => Ok(Currency::Ton),
            "USDT" => Ok(Currency::Usdt),
            _ => Err(UnknownCode(s.to_string())),
        }
    }
}

/// Chain a USDT deposit was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsdtNetwork {
    #[serde(rename = "BEP20")]
    Bep20,
    #[serde(rename = "TRC20")]
    Trc20,
    #[serde(rename = "TON")]
    Ton,
}

impl UsdtNetwork {
    pub const ALL: [UsdtNetwork; 3] = [UsdtNetwork::Bep20, UsdtNetwork::Trc20, UsdtNetwork::Ton];

    pub fn code(self) -> &'static str {
        match self {
            UsdtNetwork::Bep20 => "BEP20",
            UsdtNetwork::Trc20 => "TRC20",
            UsdtNetwork::Ton => "TON",
        }
    }

    /// Coin of the chain that settles this network's transfers.
    pub fn chain(self) -> Currency {
        match self {
            UsdtNetwork::Bep20 => Currency::Bnb,
            UsdtNetwork::Trc20 => Currency::Trx,
            UsdtNetwork::Ton => Currency::Ton,
        }
    }
}

impl fmt::Display for UsdtNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UsdtNetwork {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BEP20" => Ok(UsdtNetwork::Bep20),
            "TRC20" => Ok(UsdtNetwork::Trc20),
            "TON" => Ok(UsdtNetwork::Ton),
            _ => Err(UnknownCode(s.to_string())),
        }
    }
}

/// Depositor details collected at the start of the deposit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositorDetails {
    pub full_name: String,
    pub email: String,
    pub country: String,
    pub payout_address: String,
}

/// Values persisted once a transaction id has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRecord {
    pub plan_key: String,
    pub currency: Currency,
    pub network: Option<UsdtNetwork>,
    pub txid: String,
    pub deposit: Decimal,
}

/// Aggregates shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct AccountStats {
    pub total_users: i64,
    pub total_deposit: Decimal,
    pub total_profit: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount must not be negative")]
    Negative,
    #[error("amount is not a number with at most two decimals")]
    Malformed,
    #[error("amount is too large")]
    TooLarge,
}

/// Parse a user-supplied dollar amount ("5000", "12.5", "0.99").
///
/// At most two decimals are accepted, so every parsed amount is a whole
/// number of cents.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') {
        return Err(AmountError::Negative);
    }
    let input = input.strip_prefix('+').unwrap_or(input);

    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    if (whole.is_empty() && fraction.is_empty())
        || fraction.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::Malformed);
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::TooLarge)?
    };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| AmountError::Malformed)? * 10,
        _ => fraction.parse().map_err(|_| AmountError::Malformed)?,
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction))
        .ok_or(AmountError::TooLarge)?;

    Ok(Decimal::new(cents, 2))
}

/// Render an amount rounded to cents, e.g. `$1300.00`. Half a cent rounds
/// away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", rounded.abs())
}
