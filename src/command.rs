use teloxide::{macros::BotCommands, prelude::Requester, types::BotCommand, Bot};

use crate::error::HandlerResult;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case")]
pub enum Command {
    Start,
    Help,
    Settings,
    TiktokHd,
    TwitterOrig,
    InstagramOrig,
    IncludeLink,
    TwitterStyle(String),
}

impl Command {
    pub fn user_commands() -> Vec<BotCommand> {
        vec![
            BotCommand::new("start", t!("commands.description.start")),
            BotCommand::new("help", t!("commands.description.help")),
            BotCommand::new("settings", t!("commands.description.settings")),
            BotCommand::new("tiktok_hd", t!("commands.description.tiktok_hd")),
            BotCommand::new("twitter_orig", t!("commands.description.twitter_orig")),
            BotCommand::new("instagram_orig", t!("commands.description.instagram_orig")),
            BotCommand::new("include_link", t!("commands.description.include_link")),
            BotCommand::new("twitter_style", t!("commands.description.twitter_style")),
        ]
    }
}

pub async fn setup_user_commands(bot: &Bot) -> HandlerResult<()> {
    bot.delete_my_commands().await?;
    bot.set_my_commands(Command::user_commands()).await?;
    Ok(())
}
