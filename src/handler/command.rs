use teloxide::dispatching::{HandlerExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;
use teloxide::Bot;

use crate::command::Command;
use crate::error::HandlerResult;
use crate::service::settings::{ChatProfile, SettingsToggle, TwitterStyle};
use crate::state::AppState;

use super::keyboard::{get_settings_keyboard, get_settings_text, state_mark, style_label, toggle_label};

async fn handle_start(bot: Bot, msg: Message, state: &AppState) -> HandlerResult<()> {
    let platforms = state
        .platform_registry
        .get_supported_platforms()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    bot.send_message(msg.chat.id, t!("commands.start", platforms = platforms)).await?;
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("commands.help")).await?;
    Ok(())
}

async fn handle_settings(bot: Bot, msg: Message, state: &AppState) -> HandlerResult<()> {
    let settings = state.settings.get(msg.chat.id.0).await?;
    bot.send_message(msg.chat.id, get_settings_text(&settings))
        .reply_markup(get_settings_keyboard(&settings))
        .await?;
    Ok(())
}

async fn handle_toggle(bot: Bot, msg: Message, state: &AppState, toggle: SettingsToggle) -> HandlerResult<()> {
    let enabled = state.settings.toggle(msg.chat.id.0, toggle).await?;
    info!("Chat {} switched {} to {}", msg.chat.id, toggle, enabled);

    bot.send_message(
        msg.chat.id,
        t!(
            "commands.toggled",
            setting = toggle_label(toggle),
            state = state_mark(enabled)
        ),
    )
    .await?;
    Ok(())
}

async fn handle_twitter_style(bot: Bot, msg: Message, state: &AppState, arg: String) -> HandlerResult<()> {
    let arg = arg.trim();
    if arg.is_empty() {
        let settings = state.settings.get(msg.chat.id.0).await?;
        bot.send_message(
            msg.chat.id,
            t!("commands.twitter_style.usage", style = style_label(settings.tw_style)),
        )
        .await?;
        return Ok(());
    }

    let style = match arg.parse::<TwitterStyle>() {
        Ok(style) => style,
        Err(e) => {
            debug!("Rejected twitter style {:?}: {}", arg, e);
            bot.send_message(msg.chat.id, t!("commands.twitter_style.invalid", value = arg))
                .await?;
            return Ok(());
        }
    };

    state.settings.set_twitter_style(msg.chat.id.0, style).await?;
    bot.send_message(
        msg.chat.id,
        t!("commands.twitter_style.updated", style = style_label(style)),
    )
    .await?;
    Ok(())
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command, state: AppState) -> HandlerResult<()> {
    state.settings.ensure_chat(&ChatProfile::from_chat(&msg.chat)).await?;

    match cmd {
        Command::Start => handle_start(bot, msg, &state).await?,
        Command::Help => handle_help(bot, msg).await?,
        Command::Settings => handle_settings(bot, msg, &state).await?,
        Command::TiktokHd => handle_toggle(bot, msg, &state, SettingsToggle::TikTokHd).await?,
        Command::TwitterOrig => handle_toggle(bot, msg, &state, SettingsToggle::TwitterOrig).await?,
        Command::InstagramOrig => handle_toggle(bot, msg, &state, SettingsToggle::InstagramOrig).await?,
        Command::IncludeLink => handle_toggle(bot, msg, &state, SettingsToggle::IncludeLink).await?,
        Command::TwitterStyle(arg) => handle_twitter_style(bot, msg, &state, arg).await?,
    }

    Ok(())
}

pub fn get_command_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command)
}
