//! Telegram front end.
//!
//! Updates arrive from teloxide's webhook listener or from long polling
//! and go through one `Dispatcher`. The dispatcher handles them one at a
//! time, each to completion before the next.
//!
//! # Error Handling
//!
//! Handler errors never stop the dispatcher. They are logged and a short
//! notice is sent to the administrator.

pub mod admin;
pub mod callback;
pub mod command;
pub mod conversation;
pub mod handlers;
pub mod i18n;
pub mod keyboards;

use std::sync::Arc;

use teloxide::{
    dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler},
    prelude::*,
    types::{InlineKeyboardMarkup, MessageId},
};
use url::Url;

use crate::{
    bot::{command::Command, conversation::Sessions},
    config::Catalog,
    db::DbPool,
    error::AppError,
    services::verification::VerificationDispatcher,
};

/// Everything a handler needs, built once at startup.
pub struct BotState {
    pub bot: Bot,
    pub pool: DbPool,
    pub catalog: Arc<Catalog>,
    pub verifier: VerificationDispatcher,
    pub sessions: Sessions,
    pub admin_id: i64,
    pub support_url: Option<Url>,
}

impl BotState {
    pub fn is_admin(&self, user_id: i64) -> bool {
        user_id == self.admin_id
    }
}

/// Where a handler's answer goes: a new message, or an edit of the message
/// whose button was pressed.
pub struct Reply<'a> {
    bot: &'a Bot,
    chat_id: ChatId,
    edit: Option<MessageId>,
}

impl<'a> Reply<'a> {
    pub fn send(bot: &'a Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            edit: None,
        }
    }

    pub fn edit(bot: &'a Bot, chat_id: ChatId, message_id: Option<MessageId>) -> Self {
        Self {
            bot,
            chat_id,
            edit: message_id,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Show `text` with an optional keyboard. A failed edit (deleted or
    /// unchanged message) falls back to sending a new message.
    pub async fn show(
        &self,
        text: impl Into<String>,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), AppError> {
        let text = text.into();

        if let Some(message_id) = self.edit {
            let mut request = self.bot.edit_message_text(self.chat_id, message_id, text.clone());
            if let Some(markup) = markup.clone() {
                request = request.reply_markup(markup);
            }
            match request.await {
                Ok(_) => return Ok(()),
                Err(e) => tracing::debug!(error = %e, "Edit failed, sending a new message"),
            }
        }

        let mut request = self.bot.send_message(self.chat_id, text);
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }
}

/// Route updates: commands, then other messages, then button presses.
pub fn schema() -> UpdateHandler<AppError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handlers::on_command_message),
                )
                .endpoint(handlers::on_message),
        )
        .branch(Update::filter_callback_query().endpoint(handlers::on_callback))
}

/// Build the dispatcher around `schema`.
///
/// Every update maps to the same distribution key, so updates are handled
/// one at a time, each to completion before the next.
pub fn dispatcher(state: Arc<BotState>) -> Dispatcher<Bot, AppError, ()> {
    let bot = state.bot.clone();
    let admin_id = state.admin_id;

    Dispatcher::builder(state.bot.clone(), schema())
        .dependencies(dptree::deps![state])
        .distribution_function(|_| Some(()))
        .default_handler(|update| async move {
            tracing::trace!(update_id = update.id.0, "Ignoring update");
        })
        .error_handler(Arc::new(move |error: AppError| {
            let bot = bot.clone();
            async move { report_error(&bot, admin_id, &error).await }
        }))
        .enable_ctrlc_handler()
        .build()
}

/// Log a handler error and tell the administrator about it.
async fn report_error(bot: &Bot, admin_id: i64, error: &AppError) {
    tracing::error!(error = %error, "Error while handling update");

    if let Err(e) = bot
        .send_message(ChatId(admin_id), format!("⚠️ Error: {error}"))
        .await
    {
        tracing::warn!(error = %e, "Could not notify administrator");
    }
}
