//! Slash commands and administrator argument parsing.

use rust_decimal::Decimal;
use teloxide::utils::command::BotCommands;

use crate::{bot::conversation::AdTarget, models::account::parse_amount};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "open the main menu")]
    Start,
    #[command(description = "choose your language")]
    Language,
    #[command(description = "toggle compounding of daily profit")]
    Compound,
    #[command(description = "check that the bot is running")]
    Health,
    #[command(description = "abort the current dialog")]
    Cancel,
    #[command(description = "open the admin panel")]
    Admin,
    #[command(description = "set a user's balance")]
    SetBalance(String),
    #[command(description = "set a user's plan and deposit")]
    OverridePayment(String),
}

pub const SET_BALANCE_USAGE: &str = "/setbalance <user_id> <deposit> [profit]";
pub const OVERRIDE_PAYMENT_USAGE: &str = "/overridepayment <user_id> <plan_key> [amount]";

/// Rejected administrator arguments; `Display` is the reply text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgsError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid arguments.")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetBalanceArgs {
    pub user_id: i64,
    pub deposit: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverridePaymentArgs {
    pub user_id: i64,
    pub plan_key: String,
    /// `None` means the plan's default deposit.
    pub deposit: Option<Decimal>,
}

fn user_id(raw: &str) -> Result<i64, ArgsError> {
    raw.parse().map_err(|_| ArgsError::Invalid)
}

fn amount(raw: &str) -> Result<Decimal, ArgsError> {
    parse_amount(raw).map_err(|_| ArgsError::Invalid)
}

/// `<user_id> <deposit> [profit]`, profit defaults to zero.
pub fn parse_set_balance(args: &str) -> Result<SetBalanceArgs, ArgsError> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    match parts.as_slice() {
        [id, deposit] => Ok(SetBalanceArgs {
            user_id: user_id(id)?,
            deposit: amount(deposit)?,
            profit: Decimal::ZERO,
        }),
        [id, deposit, profit, ..] => Ok(SetBalanceArgs {
            user_id: user_id(id)?,
            deposit: amount(deposit)?,
            profit: amount(profit)?,
        }),
        _ => Err(ArgsError::Usage(SET_BALANCE_USAGE)),
    }
}

/// `<user_id> <plan_key> [amount]`.
pub fn parse_override_payment(args: &str) -> Result<OverridePaymentArgs, ArgsError> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    match parts.as_slice() {
        [id, plan_key, rest @ ..] => Ok(OverridePaymentArgs {
            user_id: user_id(id)?,
            plan_key: (*plan_key).to_string(),
            deposit: rest.first().map(|raw| amount(raw)).transpose()?,
        }),
        _ => Err(ArgsError::Usage(OVERRIDE_PAYMENT_USAGE)),
    }
}

/// `<deposit> <profit>` as typed in the admin panel's balance editor.
pub fn parse_balance_pair(input: &str) -> Result<(Decimal, Decimal), ArgsError> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    match parts.as_slice() {
        [deposit, profit] => Ok((amount(deposit)?, amount(profit)?)),
        _ => Err(ArgsError::Invalid),
    }
}

/// Broadcast target typed by the administrator: `all` or a user id.
pub fn parse_ad_target(input: &str) -> Option<AdTarget> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Some(AdTarget::All);
    }
    input.parse().ok().map(AdTarget::User)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            Command::parse("/setbalance 42 100 5", "ledger_bot").ok(),
            Some(Command::SetBalance("42 100 5".into()))
        );
        assert_eq!(
            Command::parse("/overridepayment@ledger_bot 42 plan_1", "ledger_bot").ok(),
            Some(Command::OverridePayment("42 plan_1".into()))
        );
        assert_eq!(
            Command::parse("/compound", "ledger_bot").ok(),
            Some(Command::Compound)
        );
    }

    #[test]
    fn set_balance_defaults_profit_to_zero() {
        assert_eq!(
            parse_set_balance("42 5000"),
            Ok(SetBalanceArgs {
                user_id: 42,
                deposit: Decimal::new(5000, 0),
                profit: Decimal::ZERO,
            })
        );
        assert_eq!(
            parse_set_balance(" 42  10.5  2.25 ").map(|a| (a.deposit, a.profit)),
            Ok((Decimal::new(1050, 2), Decimal::new(225, 2)))
        );
    }

    #[test]
    fn too_few_arguments_reply_with_usage() {
        assert_eq!(parse_set_balance(""), Err(ArgsError::Usage(SET_BALANCE_USAGE)));
        assert_eq!(parse_set_balance("42"), Err(ArgsError::Usage(SET_BALANCE_USAGE)));
        assert_eq!(
            parse_override_payment("42"),
            Err(ArgsError::Usage(OVERRIDE_PAYMENT_USAGE))
        );
        assert_eq!(
            ArgsError::Usage(SET_BALANCE_USAGE).to_string(),
            "Usage: /setbalance <user_id> <deposit> [profit]"
        );
    }

    #[test]
    fn unparsable_or_negative_values_are_invalid() {
        assert_eq!(parse_set_balance("abc 100"), Err(ArgsError::Invalid));
        assert_eq!(parse_set_balance("42 -100"), Err(ArgsError::Invalid));
        assert_eq!(parse_set_balance("42 100 x"), Err(ArgsError::Invalid));
        assert_eq!(parse_override_payment("42 plan_1 -1"), Err(ArgsError::Invalid));
        assert_eq!(ArgsError::Invalid.to_string(), "Invalid arguments.");
    }

    #[test]
    fn override_payment_amount_is_optional() {
        let args = parse_override_payment("7 plan_2").unwrap();
        assert_eq!(args.plan_key, "plan_2");
        assert_eq!(args.deposit, None);

        let args = parse_override_payment("7 plan_2 2500").unwrap();
        assert_eq!(args.deposit, Some(Decimal::new(2500, 0)));
    }

    #[test]
    fn balance_pair_needs_exactly_two_amounts() {
        assert_eq!(parse_balance_pair("100 20.5"), Ok((Decimal::new(100, 0), Decimal::new(2050, 2))));
        assert_eq!(parse_balance_pair("100"), Err(ArgsError::Invalid));
        assert_eq!(parse_balance_pair("100 -1"), Err(ArgsError::Invalid));
    }

    #[test]
    fn ad_target_is_all_or_a_user_id() {
        assert_eq!(parse_ad_target("all"), Some(AdTarget::All));
        assert_eq!(parse_ad_target(" ALL "), Some(AdTarget::All));
        assert_eq!(parse_ad_target("12345"), Some(AdTarget::User(12345)));
        assert_eq!(parse_ad_target("someone"), None);
    }
}
