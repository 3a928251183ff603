use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{Message, ReplyParameters};
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::platform::{find_links, DownloadState, Link};
use crate::service::delivery::{plan, send_delivery};
use crate::service::settings::{ChatProfile, ChatSettings};
use crate::state::AppState;

fn message_links(msg: &Message) -> Vec<Link> {
    msg.text()
        .or_else(|| msg.caption())
        .map(find_links)
        .unwrap_or_default()
}

async fn reply_not_found(bot: &Bot, msg: &Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("messages.not_found"))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

async fn reply_error(bot: &Bot, msg: &Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("messages.error"))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

async fn relay_link(bot: &Bot, msg: &Message, state: &AppState, settings: &ChatSettings, link: &Link) -> HandlerResult<()> {
    info!("Chat {} requested {} {}", msg.chat.id, link.platform, link.url);

    let media = match state.platform_registry.handle_download(link, &state.cache).await? {
        DownloadState::Success(media) => media,
        DownloadState::NotFound => return reply_not_found(bot, msg).await,
    };

    let delivery = plan(&media, settings, &state.config.limits);
    send_delivery(bot, msg.chat.id, msg.id, &delivery, state.config.retry.telegram_policy()).await?;

    if let Err(e) = state.settings.set_last_info(msg.chat.id.0, &media.source).await {
        warn!("Failed to record last info for chat {}: {}", msg.chat.id, e);
    }
    Ok(())
}

async fn handle_links(bot: Bot, msg: Message, state: AppState, links: Vec<Link>) -> HandlerResult<()> {
    let settings = state.settings.ensure_chat(&ChatProfile::from_chat(&msg.chat)).await?;

    for link in &links {
        if let Err(e) = relay_link(&bot, &msg, &state, &settings, link).await {
            error!("Failed to relay {}: {}", link.url, e);
            reply_error(&bot, &msg).await?;
        }
    }

    Ok(())
}

async fn handle_plain(msg: Message, state: AppState) -> HandlerResult<()> {
    state.settings.ensure_chat(&ChatProfile::from_chat(&msg.chat)).await?;
    Ok(())
}

pub fn get_message_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .branch(
            dptree::filter_map(|msg: Message| {
                let links = message_links(&msg);
                (!links.is_empty()).then_some(links)
            })
            .endpoint(handle_links),
        )
        .branch(dptree::endpoint(handle_plain))
}
