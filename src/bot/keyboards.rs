//! Inline keyboard layouts and the texts that go with them.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

use crate::{
    bot::{
        callback::Callback,
        i18n::{self, Msg},
    },
    config::Catalog,
    models::{
        account::{Account, Currency, UsdtNetwork, format_amount},
        plan::Plan,
    },
};

fn button(text: impl Into<String>, callback: Callback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, callback.to_string())
}

fn back(callback: Callback) -> Vec<InlineKeyboardButton> {
    vec![button("⬅️ Back", callback)]
}

pub fn main_menu(language: &str, support_url: Option<&Url>) -> InlineKeyboardMarkup {
    let mut rows = vec![vec![
        button(format!("📈 {}", i18n::text(language, Msg::PlansButton)), Callback::Plans),
        button(format!("💰 {}", i18n::text(language, Msg::BalanceButton)), Callback::Balance),
    ]];
    if let Some(url) = support_url {
        rows.push(vec![InlineKeyboardButton::url(
            format!("💬 {}", i18n::text(language, Msg::SupportButton)),
            url.clone(),
        )]);
    }
    InlineKeyboardMarkup::new(rows)
}

pub fn language_picker() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        i18n::LANGUAGES
            .chunks(2)
            .map(|pair| {
                pair.iter()
                    .map(|(code, name)| button(*name, Callback::Language((*code).to_string())))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>(),
    )
}

pub fn plans(catalog: &Catalog) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = catalog
        .plans
        .iter()
        .map(|plan| vec![button(&plan.title, Callback::Plan(plan.key.clone()))])
        .collect();
    rows.push(back(Callback::MainMenu));
    InlineKeyboardMarkup::new(rows)
}

pub fn plan_selected() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("✅ Continue", Callback::CollectDetails)],
        back(Callback::Plans),
    ])
}

pub fn currencies() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        Currency::PAYMENT_OPTIONS
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|currency| button(currency.code(), Callback::Pay(*currency)))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>(),
    )
}

pub fn networks() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        UsdtNetwork::ALL
            .iter()
            .map(|network| button(format!("USDT {network}"), Callback::Network(*network)))
            .collect(),
        back(Callback::PaymentMethod),
    ])
}

pub fn deposit_address() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("✅ I have sent the deposit", Callback::DepositDone)],
        back(Callback::PaymentMethod),
    ])
}

pub fn change_currency() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![back(Callback::PaymentMethod)])
}

pub fn confirm() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("✅ Yes", Callback::ConfirmYes),
        button("❌ No", Callback::ConfirmNo),
    ]])
}

pub fn back_to_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![back(Callback::MainMenu)])
}

pub fn admin_panel() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("📊 Dashboard", Callback::AdminDashboard)],
        vec![button("📢 Send Ad", Callback::AdminAdStart)],
        vec![button("👥 Manage Users", Callback::AdminUserSelect)],
        vec![button("❌ Close", Callback::AdminClose)],
    ])
}

pub fn admin_back() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![back(Callback::AdminBack)])
}

pub fn admin_users(accounts: &[Account]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = accounts
        .iter()
        .map(|account| {
            let label = match &account.full_name {
                Some(name) => format!("{name} ({})", account.telegram_id),
                None => account.telegram_id.to_string(),
            };
            vec![button(label, Callback::AdminUser(account.telegram_id))]
        })
        .collect();
    rows.push(back(Callback::AdminBack));
    InlineKeyboardMarkup::new(rows)
}

pub fn admin_user() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("✏️ Edit Balance", Callback::AdminEditBalance)],
        vec![button("🔁 Override Payment", Callback::AdminOverridePayment)],
        back(Callback::AdminBack),
    ])
}

pub fn ad_media() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("⏭ Skip", Callback::AdSkipMedia)],
        back(Callback::AdminBack),
    ])
}

pub fn ad_target() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("👥 All users", Callback::AdTargetAll)],
        back(Callback::AdminBack),
    ])
}

pub fn ad_confirm() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("✅ Send", Callback::AdConfirm)],
        back(Callback::AdminBack),
    ])
}

/// One line per plan: title, range and daily rate.
pub fn plans_text(catalog: &Catalog) -> String {
    catalog
        .plans
        .iter()
        .map(|plan| {
            format!(
                "• {}: {} at {}% daily",
                plan.title,
                plan.equity_range,
                plan.daily_percent()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn plan_text(plan: &Plan) -> String {
    format!(
        "{}\nRange: {}\nDaily rate: {}%\nDeposit: {}",
        plan.title,
        plan.equity_range,
        plan.daily_percent(),
        format_amount(plan.deposit())
    )
}

pub fn balance_text(account: Option<&Account>) -> String {
    let (deposit, profit, total) = account
        .map(|a| (a.deposit, a.profit, a.total()))
        .unwrap_or_default();
    format!(
        "Deposit: {}\nProfit: {}\nTotal: {}",
        format_amount(deposit),
        format_amount(profit),
        format_amount(total)
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{"plans": [
                {"key": "plan_1", "title": "First", "equity_range": "$500 - $999",
                 "daily_rate_bps": 3000, "deposit_cents": 100000},
                {"key": "plan_2", "title": "Second", "equity_range": "$1,000+",
                 "daily_rate_bps": 250, "deposit_cents": 250000}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn picker_offers_every_language() {
        let data = callback_data(&language_picker());
        assert_eq!(data.len(), 9);
        assert_eq!(language_picker().inline_keyboard.len(), 5);
        for code in ["ar", "hi", "zh"] {
            assert!(data.contains(&format!("lang:{code}")), "{code} missing");
        }
    }

    #[test]
    fn every_button_parses_as_a_callback() {
        let layouts = [
            main_menu("en", None),
            language_picker(),
            plans(&catalog()),
            plan_selected(),
            currencies(),
            networks(),
            deposit_address(),
            change_currency(),
            confirm(),
            admin_panel(),
            admin_user(),
            ad_media(),
            ad_target(),
            ad_confirm(),
        ];
        for layout in &layouts {
            for data in callback_data(layout) {
                assert!(data.parse::<Callback>().is_ok(), "{data} does not parse");
            }
        }
    }

    #[test]
    fn support_button_only_when_configured() {
        assert_eq!(main_menu("en", None).inline_keyboard.len(), 1);

        let url = Url::parse("https://t.me/support").unwrap();
        let menu = main_menu("es", Some(&url));
        assert_eq!(menu.inline_keyboard.len(), 2);
        assert!(menu.inline_keyboard[0][0].text.contains("Planes"));
    }

    #[test]
    fn plans_keyboard_lists_catalog_plans() {
        assert_eq!(
            callback_data(&plans(&catalog())),
            vec!["plan:plan_1", "plan:plan_2", "main_menu"]
        );
        assert_eq!(
            plans_text(&catalog()),
            "• First: $500 - $999 at 30% daily\n• Second: $1,000+ at 2.5% daily"
        );
    }

    #[test]
    fn balance_of_unknown_user_is_zero() {
        assert_eq!(balance_text(None), "Deposit: $0.00\nProfit: $0.00\nTotal: $0.00");

        let mut account = Account::new(1);
        account.deposit = Decimal::new(130_000, 2);
        account.profit = Decimal::new(39_000, 2);
        assert_eq!(
            balance_text(Some(&account)),
            "Deposit: $1300.00\nProfit: $390.00\nTotal: $1690.00"
        );

        account.profit = Decimal::new(10_025, 4);
        assert_eq!(
            balance_text(Some(&account)),
            "Deposit: $1300.00\nProfit: $1.00\nTotal: $1301.00"
        );
    }
}
