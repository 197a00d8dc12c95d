//! Inline button identifiers.
//!
//! Every button the bot sends carries a short string in its callback data.
//! `Callback` is the parsed form; `Display` produces the string and
//! `FromStr` is the lookup table back. Parameterised buttons use a
//! `prefix:value` layout.

use std::{fmt, str::FromStr};

use crate::{
    bot::i18n,
    models::account::{Currency, UsdtNetwork},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    MainMenu,
    Plans,
    Balance,
    Plan(String),
    CollectDetails,
    PaymentMethod,
    Pay(Currency),
    Network(UsdtNetwork),
    DepositDone,
    ConfirmYes,
    ConfirmNo,
    Language(String),

    AdminDashboard,
    AdminAdStart,
    AdminUserSelect,
    AdminUser(i64),
    AdminEditBalance,
    AdminOverridePayment,
    AdminBack,
    AdminClose,
    AdSkipMedia,
    AdTargetAll,
    AdConfirm,
}

impl Callback {
    /// Buttons that can be pressed at any time without affecting the dialog.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Callback::MainMenu | Callback::Plans | Callback::Balance | Callback::Language(_)
        )
    }

    /// Buttons that only the administrator may press.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Callback::AdminDashboard
                | Callback::AdminAdStart
                | Callback::AdminUserSelect
                | Callback::AdminUser(_)
                | Callback::AdminEditBalance
                | Callback::AdminOverridePayment
                | Callback::AdminBack
                | Callback::AdminClose
                | Callback::AdSkipMedia
                | Callback::AdTargetAll
                | Callback::AdConfirm
        )
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::MainMenu => f.write_str("main_menu"),
            Callback::Plans => f.write_str("plans"),
            Callback::Balance => f.write_str("balance"),
            Callback::Plan(key) => write!(f, "plan:{key}"),
            Callback::CollectDetails => f.write_str("collect_details"),
            Callback::PaymentMethod => f.write_str("payment_method"),
            Callback::Pay(currency) => write!(f, "pay:{}", currency.code().to_ascii_lowercase()),
            Callback::Network(network) => write!(f, "usdt:{}", network.code()),
            Callback::DepositDone => f.write_str("deposit_done"),
            Callback::ConfirmYes => f.write_str("confirm_yes"),
            Callback::ConfirmNo => f.write_str("confirm_no"),
            Callback::Language(code) => write!(f, "lang:{code}"),
            Callback::AdminDashboard => f.write_str("admin_dashboard"),
            Callback::AdminAdStart => f.write_str("admin_ad_start"),
            Callback::AdminUserSelect => f.write_str("admin_user_select"),
            Callback::AdminUser(id) => write!(f, "admin_user:{id}"),
            Callback::AdminEditBalance => f.write_str("admin_edit_balance"),
            Callback::AdminOverridePayment => f.write_str("admin_override_payment"),
            Callback::AdminBack => f.write_str("admin_back"),
            Callback::AdminClose => f.write_str("admin_close"),
            Callback::AdSkipMedia => f.write_str("ad_skip_media"),
            Callback::AdTargetAll => f.write_str("ad_target_all"),
            Callback::AdConfirm => f.write_str("ad_confirm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown callback data `{0}`")]
pub struct UnknownCallback(pub String);

impl FromStr for Callback {
    type Err = UnknownCallback;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCallback(data.to_string());

        let fixed = match data {
            "main_menu" => Some(Callback::MainMenu),
            "plans" => Some(Callback::Plans),
            "balance" => Some(Callback::Balance),
            "collect_details" => Some(Callback::CollectDetails),
            "payment_method" => Some(Callback::PaymentMethod),
            "deposit_done" => Some(Callback::DepositDone),
            "confirm_yes" => Some(Callback::ConfirmYes),
            "confirm_no" => Some(Callback::ConfirmNo),
            "admin_dashboard" => Some(Callback::AdminDashboard),
            "admin_ad_start" => Some(Callback::AdminAdStart),
            "admin_user_select" => Some(Callback::AdminUserSelect),
            "admin_edit_balance" => Some(Callback::AdminEditBalance),
            "admin_override_payment" => Some(Callback::AdminOverridePayment),
            "admin_back" => Some(Callback::AdminBack),
            "admin_close" => Some(Callback::AdminClose),
            "ad_skip_media" => Some(Callback::AdSkipMedia),
            "ad_target_all" => Some(Callback::AdTargetAll),
            "ad_confirm" => Some(Callback::AdConfirm),
            _ => None,
        };
        if let Some(callback) = fixed {
            return Ok(callback);
        }

        let (prefix, value) = data.split_once(':').ok_or_else(unknown)?;
        if value.is_empty() {
            return Err(unknown());
        }
        match prefix {
            "plan" => Ok(Callback::Plan(value.to_string())),
            "pay" => value
                .parse::<Currency>()
                .ok()
                .filter(|c| Currency::PAYMENT_OPTIONS.contains(c))
                .map(Callback::Pay)
                .ok_or_else(unknown),
            "usdt" => value.parse().map(Callback::Network).map_err(|_| unknown()),
            "lang" if i18n::is_supported(value) => Ok(Callback::Language(value.to_string())),
            "admin_user" => value.parse().map(Callback::AdminUser).map_err(|_| unknown()),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_button_parses_back_to_itself() {
        let buttons = [
            Callback::MainMenu,
            Callback::Plans,
            Callback::Balance,
            Callback::Plan("plan_3".into()),
            Callback::CollectDetails,
            Callback::PaymentMethod,
            Callback::Pay(Currency::Usdt),
            Callback::Network(UsdtNetwork::Trc20),
            Callback::DepositDone,
            Callback::ConfirmYes,
            Callback::ConfirmNo,
            Callback::Language("de".into()),
            Callback::AdminDashboard,
            Callback::AdminAdStart,
            Callback::AdminUserSelect,
            Callback::AdminUser(-100123),
            Callback::AdminEditBalance,
            Callback::AdminOverridePayment,
            Callback::AdminBack,
            Callback::AdminClose,
            Callback::AdSkipMedia,
            Callback::AdTargetAll,
            Callback::AdConfirm,
        ];

        for button in buttons {
            let data = button.to_string();
            assert!(data.len() <= 64, "{data} exceeds Telegram's callback limit");
            assert_eq!(data.parse::<Callback>(), Ok(button));
        }
    }

    #[test]
    fn rejects_unknown_data() {
        for data in [
            "",
            "nope",
            "plan:",
            "pay:doge",
            "pay:trx",
            "usdt:ERC20",
            "lang:xx",
            "admin_user:abc",
        ] {
            assert!(data.parse::<Callback>().is_err(), "{data} should be rejected");
        }
    }

    #[test]
    fn classifies_buttons() {
        assert!(Callback::Balance.is_navigation());
        assert!(!Callback::DepositDone.is_navigation());
        assert!(Callback::AdConfirm.is_admin());
        assert!(!Callback::Plan("plan_1".into()).is_admin());
    }
}
