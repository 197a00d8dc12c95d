//! Administrator panel and commands.
//!
//! Callers check `ensure_admin` before reaching any other entry point.
//! Replies are in English.

use teloxide::{prelude::*, types::InputFile};

use crate::{
    bot::{
        BotState, Reply,
        command::{self, ArgsError},
        conversation::{AdDraft, AdTarget, MediaKind, Step},
        i18n::{self, Msg},
        keyboards,
    },
    error::AppError,
    models::account::format_amount,
    services::account_service,
};

/// Buttons shown at most in the "Manage Users" list.
const MAX_LISTED_USERS: usize = 50;

const USER_NOT_FOUND: &str = "User not found.";
const INVALID_PLAN: &str = "Invalid plan key.";

/// `NotAuthorized` unless `user_id` is the configured administrator.
pub fn ensure_admin(state: &BotState, user_id: i64) -> Result<(), AppError> {
    if state.is_admin(user_id) {
        Ok(())
    } else {
        Err(AppError::NotAuthorized)
    }
}

/// Reply for errors an admin command answers instead of failing.
fn rejection(error: &AppError) -> Option<String> {
    match error {
        AppError::AccountNotFound => Some(USER_NOT_FOUND.to_string()),
        AppError::InvalidPlan => Some(INVALID_PLAN.to_string()),
        AppError::InvalidArguments => Some(ArgsError::Invalid.to_string()),
        _ => None,
    }
}

/// Send the command's outcome, or the reply for a rejected command.
async fn answer(reply: &Reply<'_>, outcome: Result<String, AppError>) -> Result<(), AppError> {
    match outcome {
        Ok(text) => reply.show(text, None).await,
        Err(e) => match rejection(&e) {
            Some(text) => reply.show(text, None).await,
            None => Err(e),
        },
    }
}

pub async fn open_panel(state: &BotState, reply: &Reply<'_>, user_id: i64) -> Result<(), AppError> {
    state.sessions.with(user_id, |session| session.enter_admin()).await;
    reply.show("🛠 Admin panel", Some(keyboards::admin_panel())).await
}

/// `/setbalance <user_id> <deposit> [profit]`
pub async fn set_balance_command(
    state: &BotState,
    reply: &Reply<'_>,
    args: &str,
) -> Result<(), AppError> {
    let args = match command::parse_set_balance(args) {
        Ok(args) => args,
        Err(e) => return reply.show(e.to_string(), None).await,
    };

    let outcome = account_service::set_balance(
        &state.pool,
        args.user_id,
        args.deposit,
        args.profit,
    )
    .await
    .map(|()| {
        tracing::info!(
            user_id = args.user_id,
            deposit = %args.deposit,
            profit = %args.profit,
            "Balance overridden"
        );
        format!(
            "Balance updated for user {}: deposit {}, profit {}.",
            args.user_id,
            format_amount(args.deposit),
            format_amount(args.profit)
        )
    });
    answer(reply, outcome).await
}

/// `/overridepayment <user_id> <plan_key> [amount]`
///
/// The amount defaults to the plan's deposit. The user is told their
/// account is active.
pub async fn override_payment_command(
    state: &BotState,
    reply: &Reply<'_>,
    args: &str,
) -> Result<(), AppError> {
    let args = match command::parse_override_payment(args) {
        Ok(args) => args,
        Err(e) => return reply.show(e.to_string(), None).await,
    };
    let outcome = override_payment(state, &args).await;
    answer(reply, outcome).await
}

async fn override_payment(
    state: &BotState,
    args: &command::OverridePaymentArgs,
) -> Result<String, AppError> {
    let plan = state
        .catalog
        .plan(&args.plan_key)
        .ok_or(AppError::InvalidPlan)?;
    let deposit = args.deposit.unwrap_or_else(|| plan.deposit());

    let account =
        account_service::override_plan(&state.pool, args.user_id, &plan.key, deposit).await?;
    tracing::info!(
        user_id = args.user_id,
        plan = %plan.key,
        deposit = %deposit,
        "Payment overridden"
    );

    if let Err(e) = state
        .bot
        .send_message(
            ChatId(account.telegram_id),
            i18n::text(&account.language, Msg::Activated),
        )
        .await
    {
        tracing::warn!(user_id = args.user_id, error = %e, "Could not notify user");
    }

    Ok(format!(
        "Payment overridden for user {}: plan {}, deposit {}.",
        args.user_id,
        plan.key,
        format_amount(deposit)
    ))
}

/// Carry out an admin step of the dialog.
pub async fn perform(state: &BotState, reply: &Reply<'_>, step: Step) -> Result<(), AppError> {
    match step {
        Step::AdminPanel => reply.show("🛠 Admin panel", Some(keyboards::admin_panel())).await,

        Step::Dashboard => {
            let stats = account_service::account_stats(&state.pool).await?;
            let text = format!(
                "📊 Dashboard\n\nUsers: {}\nTotal deposits: {}\nTotal profit: {}",
                stats.total_users,
                format_amount(stats.total_deposit),
                format_amount(stats.total_profit)
            );
            reply.show(text, Some(keyboards::admin_back())).await
        }

        Step::AskAdText => {
            reply
                .show("Send the text of the ad:", Some(keyboards::admin_back()))
                .await
        }
        Step::AskAdMedia => {
            reply
                .show(
                    "Send a photo or video for the ad, or skip:",
                    Some(keyboards::ad_media()),
                )
                .await
        }
        Step::AskAdTarget => {
            reply
                .show(
                    "Send the user id to send the ad to, or choose all users:",
                    Some(keyboards::ad_target()),
                )
                .await
        }
        Step::InvalidAdTarget => {
            reply
                .show(
                    "Invalid target. Send a numeric user id or \"all\":",
                    Some(keyboards::ad_target()),
                )
                .await
        }
        Step::AdPreview(draft) => preview(state, reply, &draft).await,
        Step::Broadcast(draft) => {
            let sent = broadcast(state, &draft).await?;
            reply
                .show(
                    format!("✅ Ad sent to {sent} users."),
                    Some(keyboards::admin_panel()),
                )
                .await
        }

        Step::ListUsers => {
            let accounts = account_service::list_accounts(&state.pool).await?;
            let shown = &accounts[..accounts.len().min(MAX_LISTED_USERS)];
            reply
                .show(
                    format!("👥 Users ({}):", accounts.len()),
                    Some(keyboards::admin_users(shown)),
                )
                .await
        }
        Step::UserSelected(user_id) => {
            match account_service::find_account(&state.pool, user_id).await? {
                Some(account) => {
                    let text = format!(
                        "User {}\nName: {}\nEmail: {}\nPlan: {}\n{}",
                        account.telegram_id,
                        account.full_name.as_deref().unwrap_or("-"),
                        account.email.as_deref().unwrap_or("-"),
                        account.selected_plan.as_deref().unwrap_or("-"),
                        keyboards::balance_text(Some(&account))
                    );
                    reply.show(text, Some(keyboards::admin_user())).await
                }
                None => reply.show(USER_NOT_FOUND, Some(keyboards::admin_back())).await,
            }
        }
        Step::AskBalance(user_id) => {
            reply
                .show(
                    format!("Send the new balance for user {user_id} as: <deposit> <profit>"),
                    Some(keyboards::admin_back()),
                )
                .await
        }
        Step::InvalidBalance(e) => {
            reply
                .show(
                    format!("{e} Send: <deposit> <profit>"),
                    Some(keyboards::admin_back()),
                )
                .await
        }
        Step::SetBalance {
            user_id,
            deposit,
            profit,
        } => match account_service::set_balance(&state.pool, user_id, deposit, profit).await {
            Ok(()) => {
                tracing::info!(user_id, %deposit, %profit, "Balance overridden");
                reply
                    .show(
                        format!("✅ Balance updated for user {user_id}."),
                        Some(keyboards::admin_panel()),
                    )
                    .await
            }
            Err(AppError::AccountNotFound) => {
                reply.show(USER_NOT_FOUND, Some(keyboards::admin_panel())).await
            }
            Err(e) => Err(e),
        },
        Step::OverrideHelp(user_id) => {
            let plans = state
                .catalog
                .plans
                .iter()
                .map(|plan| plan.key.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            reply
                .show(
                    format!(
                        "Usage: /overridepayment {user_id} <plan_key> [amount]\nPlans: {plans}"
                    ),
                    Some(keyboards::admin_back()),
                )
                .await
        }
        Step::ClosePanel => reply.show("Admin panel closed.", None).await,

        _ => Ok(()),
    }
}

fn target_label(target: Option<AdTarget>) -> String {
    match target {
        Some(AdTarget::User(id)) => format!("user {id}"),
        Some(AdTarget::All) | None => "all users".to_string(),
    }
}

/// Show the ad as recipients will see it, then ask for confirmation.
async fn preview(state: &BotState, reply: &Reply<'_>, draft: &AdDraft) -> Result<(), AppError> {
    deliver(&state.bot, reply.chat_id(), draft).await?;
    reply
        .show(
            format!("Send this ad to {}?", target_label(draft.target)),
            Some(keyboards::ad_confirm()),
        )
        .await
}

async fn deliver(bot: &Bot, chat_id: ChatId, draft: &AdDraft) -> Result<(), teloxide::RequestError> {
    match &draft.media {
        Some(media) => {
            let file = InputFile::file_id(media.file_id.clone());
            match media.kind {
                MediaKind::Photo => {
                    bot.send_photo(chat_id, file).caption(draft.text.clone()).await?;
                }
                MediaKind::Video => {
                    bot.send_video(chat_id, file).caption(draft.text.clone()).await?;
                }
            }
        }
        None => {
            bot.send_message(chat_id, draft.text.clone()).await?;
        }
    }
    Ok(())
}

/// Send the ad to its recipients. Returns how many deliveries succeeded;
/// failures are logged per recipient.
async fn broadcast(state: &BotState, draft: &AdDraft) -> Result<usize, AppError> {
    let recipients: Vec<i64> = match draft.target {
        Some(AdTarget::User(id)) => vec![id],
        Some(AdTarget::All) | None => account_service::list_accounts(&state.pool)
            .await?
            .into_iter()
            .map(|account| account.telegram_id)
            .collect(),
    };

    let mut sent = 0;
    for recipient in &recipients {
        match deliver(&state.bot, ChatId(*recipient), draft).await {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!(recipient, error = %e, "Ad delivery failed"),
        }
    }
    tracing::info!(sent, recipients = recipients.len(), "Ad broadcast finished");

    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_have_fixed_replies() {
        assert_eq!(rejection(&AppError::AccountNotFound).as_deref(), Some("User not found."));
        assert_eq!(rejection(&AppError::InvalidPlan).as_deref(), Some("Invalid plan key."));
        assert_eq!(
            rejection(&AppError::InvalidArguments).as_deref(),
            Some("Invalid arguments.")
        );
        assert_eq!(rejection(&AppError::NotAuthorized), None);
        assert_eq!(rejection(&AppError::Database(sqlx::Error::RowNotFound)), None);
    }

    #[test]
    fn labels_broadcast_targets() {
        assert_eq!(target_label(Some(AdTarget::User(5))), "user 5");
        assert_eq!(target_label(Some(AdTarget::All)), "all users");
    }
}
