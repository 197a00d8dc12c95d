//! Message and button handlers for regular users.
//!
//! The `on_*` endpoints are wired into the dispatcher by `bot::schema`.
//! Handlers turn an update into a dialog input, run it through the
//! session's state machine and carry out the returned `Step`. Admin steps
//! are delegated to `bot::admin`.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::{
    bot::{
        BotState, Reply, admin,
        callback::Callback,
        command::Command,
        conversation::{Input, Media, MediaKind, Step},
        i18n::{self, Msg},
        keyboards,
    },
    error::AppError,
    models::account::{Currency, UsdtNetwork, format_amount},
    services::account_service,
};

/// Answer to callback data no button produces.
const OPTION_NOT_HANDLED: &str = "Option not handled.";

fn user_chat_id(user: &teloxide::types::User) -> i64 {
    ChatId::from(user.id).0
}

fn media_of(message: &Message) -> Option<Media> {
    if let Some(photo) = message.photo().and_then(|sizes| sizes.last()) {
        return Some(Media {
            kind: MediaKind::Photo,
            file_id: photo.file.id.clone(),
        });
    }
    message.video().map(|video| Media {
        kind: MediaKind::Video,
        file_id: video.file.id.clone(),
    })
}

/// Endpoint for a message that parsed as one of our commands.
pub async fn on_command_message(
    state: Arc<BotState>,
    message: Message,
    command: Command,
) -> Result<(), AppError> {
    let Some(user) = message.from.as_ref() else {
        return Ok(());
    };
    let reply = Reply::send(&state.bot, message.chat.id);
    on_command(&state, &reply, user_chat_id(user), command).await
}

/// Endpoint for every other message: dialog text or an uploaded photo or
/// video.
pub async fn on_message(state: Arc<BotState>, message: Message) -> Result<(), AppError> {
    let Some(user) = message.from.as_ref() else {
        return Ok(());
    };
    let user_id = user_chat_id(user);
    let reply = Reply::send(&state.bot, message.chat.id);

    if let Some(text) = message.text() {
        return drive(&state, &reply, user_id, Input::Text(text)).await;
    }

    if let Some(media) = media_of(&message) {
        return drive(&state, &reply, user_id, Input::Media(&media)).await;
    }

    Ok(())
}

async fn on_command(
    state: &BotState,
    reply: &Reply<'_>,
    user_id: i64,
    command: Command,
) -> Result<(), AppError> {
    let language = account_service::language_of(&state.pool, user_id).await?;

    match command {
        Command::Start => match account_service::find_account(&state.pool, user_id).await? {
            Some(account) => show_main_menu(state, reply, &account.language).await,
            None => {
                reply
                    .show(
                        i18n::text(&language, Msg::ChooseLanguage),
                        Some(keyboards::language_picker()),
                    )
                    .await
            }
        },
        Command::Language => {
            reply
                .show(
                    i18n::text(&language, Msg::ChooseLanguage),
                    Some(keyboards::language_picker()),
                )
                .await
        }
        Command::Compound => {
            let key = match account_service::toggle_compound(&state.pool, user_id).await? {
                Some(true) => Msg::CompoundOn,
                Some(false) | None => Msg::CompoundOff,
            };
            reply.show(i18n::text(&language, key), None).await
        }
        Command::Health => reply.show("✅ Bot is running.", None).await,
        Command::Cancel => {
            state.sessions.with(user_id, |session| session.reset()).await;
            reply
                .show(
                    i18n::text(&language, Msg::Cancelled),
                    Some(keyboards::main_menu(&language, state.support_url.as_ref())),
                )
                .await
        }
        Command::Admin | Command::SetBalance(_) | Command::OverridePayment(_) => {
            if let Err(e) = admin::ensure_admin(state, user_id) {
                tracing::warn!(user_id, error = %e, "Admin command refused");
                return reply.show(i18n::text(&language, Msg::NotAuthorized), None).await;
            }
            match command {
                Command::SetBalance(args) => admin::set_balance_command(state, reply, &args).await,
                Command::OverridePayment(args) => {
                    admin::override_payment_command(state, reply, &args).await
                }
                _ => admin::open_panel(state, reply, user_id).await,
            }
        }
    }
}

/// Endpoint for a pressed inline button.
pub async fn on_callback(state: Arc<BotState>, query: CallbackQuery) -> Result<(), AppError> {
    handle_callback(&state, &query).await
}

async fn handle_callback(state: &BotState, query: &CallbackQuery) -> Result<(), AppError> {
    let user_id = user_chat_id(&query.from);
    let message = query.regular_message();
    let chat_id = message.map_or(ChatId(user_id), |m| m.chat.id);
    let reply = Reply::edit(&state.bot, chat_id, message.map(|m| m.id));

    let callback = match query.data.as_deref().map(str::parse::<Callback>) {
        Some(Ok(callback)) => callback,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Unhandled callback data");
            state
                .bot
                .answer_callback_query(query.id.clone())
                .text(OPTION_NOT_HANDLED)
                .await?;
            return Ok(());
        }
        None => {
            state.bot.answer_callback_query(query.id.clone()).await?;
            return Ok(());
        }
    };

    let language = account_service::language_of(&state.pool, user_id).await?;

    if callback.is_admin() && admin::ensure_admin(state, user_id).is_err() {
        state
            .bot
            .answer_callback_query(query.id.clone())
            .text(i18n::text(&language, Msg::NotAuthorized))
            .await?;
        return Ok(());
    }

    if callback.is_navigation() {
        state.bot.answer_callback_query(query.id.clone()).await?;
        return navigate(state, &reply, user_id, &language, &callback).await;
    }

    let step = state
        .sessions
        .with(user_id, |session| {
            session.apply(Input::Button(&callback), &state.catalog)
        })
        .await;

    if step == Step::Expired {
        state
            .bot
            .answer_callback_query(query.id.clone())
            .text(i18n::text(&language, Msg::OptionExpired))
            .await?;
        return Ok(());
    }

    state.bot.answer_callback_query(query.id.clone()).await?;
    perform(state, &reply, user_id, &language, step).await
}

/// Buttons that work in every dialog state and leave it untouched.
async fn navigate(
    state: &BotState,
    reply: &Reply<'_>,
    user_id: i64,
    language: &str,
    callback: &Callback,
) -> Result<(), AppError> {
    match callback {
        Callback::MainMenu => show_main_menu(state, reply, language).await,
        Callback::Plans => {
            reply
                .show(
                    keyboards::plans_text(&state.catalog),
                    Some(keyboards::plans(&state.catalog)),
                )
                .await
        }
        Callback::Balance => {
            let account = account_service::find_account(&state.pool, user_id).await?;
            reply
                .show(
                    keyboards::balance_text(account.as_ref()),
                    Some(keyboards::back_to_menu()),
                )
                .await
        }
        Callback::Language(code) => {
            let account = account_service::set_language(&state.pool, user_id, code).await?;
            show_main_menu(state, reply, &account.language).await
        }
        _ => Ok(()),
    }
}

async fn show_main_menu(
    state: &BotState,
    reply: &Reply<'_>,
    language: &str,
) -> Result<(), AppError> {
    reply
        .show(
            i18n::text(language, Msg::Welcome),
            Some(keyboards::main_menu(language, state.support_url.as_ref())),
        )
        .await
}

/// Feed typed text or an upload into the user's dialog.
async fn drive(
    state: &BotState,
    reply: &Reply<'_>,
    user_id: i64,
    input: Input<'_>,
) -> Result<(), AppError> {
    let step = state
        .sessions
        .with(user_id, |session| session.apply(input, &state.catalog))
        .await;

    if step == Step::Ignore {
        return Ok(());
    }

    let language = account_service::language_of(&state.pool, user_id).await?;
    perform(state, reply, user_id, &language, step).await
}

fn currency_label(currency: Currency, network: Option<UsdtNetwork>) -> String {
    match network {
        Some(network) if currency == Currency::Usdt => format!("USDT ({network})"),
        _ => currency.to_string(),
    }
}

/// Carry out the effect of one dialog transition.
async fn perform(
    state: &BotState,
    reply: &Reply<'_>,
    user_id: i64,
    language: &str,
    step: Step,
) -> Result<(), AppError> {
    match step {
        Step::Ignore => Ok(()),
        Step::Expired => reply.show(i18n::text(language, Msg::OptionExpired), None).await,
        Step::Ask(key) => reply.show(i18n::text(language, key), None).await,

        Step::PlanSelected(key) => match state.catalog.plan(&key) {
            Some(plan) => {
                reply
                    .show(keyboards::plan_text(plan), Some(keyboards::plan_selected()))
                    .await
            }
            None => reply.show(i18n::text(language, Msg::OptionExpired), None).await,
        },

        Step::SaveDetails { plan_key, details } => {
            account_service::save_depositor_details(&state.pool, user_id, &plan_key, &details)
                .await?;
            reply
                .show(
                    i18n::text(language, Msg::DetailsSaved),
                    Some(keyboards::currencies()),
                )
                .await
        }

        Step::ShowCurrencies => {
            reply
                .show(
                    i18n::text(language, Msg::ChooseCurrency),
                    Some(keyboards::currencies()),
                )
                .await
        }

        Step::ShowNetworks => {
            reply
                .show(
                    i18n::text(language, Msg::ChooseNetwork),
                    Some(keyboards::networks()),
                )
                .await
        }

        Step::ShowAddress { currency, network } => {
            let label = currency_label(currency, network);
            match state.catalog.deposit_address(currency, network) {
                Some(address) => {
                    let text = i18n::format(
                        language,
                        Msg::DepositAddress,
                        &[("currency", label.as_str()), ("address", address)],
                    );
                    reply.show(text, Some(keyboards::deposit_address())).await
                }
                None => {
                    let text =
                        i18n::format(language, Msg::AddressUnavailable, &[("currency", label.as_str())]);
                    reply.show(text, Some(keyboards::change_currency())).await
                }
            }
        }

        Step::VerifyTxId {
            txid,
            currency,
            network,
        } => {
            if !state.verifier.verify(&txid, currency, network).await {
                state
                    .sessions
                    .with(user_id, |session| session.txid_rejected())
                    .await;
                return reply.show(i18n::text(language, Msg::InvalidTxId), None).await;
            }

            let record = state
                .sessions
                .with(user_id, |session| session.txid_verified(&txid, &state.catalog))
                .await;
            let Some(record) = record else {
                return Ok(());
            };

            account_service::record_deposit(&state.pool, user_id, &record).await?;
            tracing::info!(
                user_id,
                plan = %record.plan_key,
                currency = %record.currency,
                deposit = %record.deposit,
                "Deposit recorded"
            );

            let amount = format_amount(record.deposit);
            let text = i18n::format(
                language,
                Msg::TxIdReceived,
                &[("txid", record.txid.as_str()), ("amount", amount.as_str())],
            );
            reply.show(text, Some(keyboards::confirm())).await
        }

        Step::AskWallet { deposit } => {
            let amount = format_amount(deposit);
            let text = i18n::format(language, Msg::DepositConfirmed, &[("amount", amount.as_str())]);
            reply.show(text, None).await
        }

        Step::SaveWallet(address) => {
            account_service::set_wallet_address(&state.pool, user_id, &address).await?;
            reply
                .show(
                    i18n::text(language, Msg::Activated),
                    Some(keyboards::main_menu(language, state.support_url.as_ref())),
                )
                .await
        }

        admin_step => admin::perform(state, reply, admin_step).await,
    }
}
