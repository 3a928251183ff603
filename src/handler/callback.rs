use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::service::settings::{ChatProfile, SettingsToggle, TwitterStyle};
use crate::state::AppState;

use super::keyboard::{get_settings_keyboard, get_settings_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Toggle(SettingsToggle),
    Style(TwitterStyle),
}

impl SettingsAction {
    pub fn parse(data: &str) -> Option<Self> {
        let (kind, value) = data.split_once(':')?;
        match kind {
            "toggle" => value.parse().ok().map(Self::Toggle),
            "style" => value.parse().ok().map(Self::Style),
            _ => None,
        }
    }
}

async fn handle_callback(bot: Bot, q: CallbackQuery, state: AppState) -> HandlerResult<()> {
    let Some(action) = q.data.as_deref().and_then(SettingsAction::parse) else {
        debug!("Ignoring callback data {:?}", q.data);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let Some(message) = q.message.as_ref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let chat_id = message.chat().id;
    state.settings.ensure_chat(&ChatProfile::from_chat(message.chat())).await?;

    match action {
        SettingsAction::Toggle(toggle) => {
            let enabled = state.settings.toggle(chat_id.0, toggle).await?;
            info!("Chat {} switched {} to {}", chat_id, toggle, enabled);
        }
        SettingsAction::Style(style) => {
            state.settings.set_twitter_style(chat_id.0, style).await?;
            info!("Chat {} set twitter style {}", chat_id, style.value());
        }
    }

    bot.answer_callback_query(q.id.clone()).await?;

    let settings = state.settings.get(chat_id.0).await?;
    bot.edit_message_text(chat_id, message.id(), get_settings_text(&settings))
        .reply_markup(get_settings_keyboard(&settings))
        .await?;

    Ok(())
}

pub fn get_callback_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_callback_query().endpoint(handle_callback)
}
