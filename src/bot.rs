use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::Bot;

use crate::command;
use crate::error::HandlerResult;
use crate::handler::get_handler;
use crate::state::AppState;
use crate::utils::http;

pub struct BotService {
    pub bot: Bot,
    pub state: AppState,
}

impl BotService {
    pub fn new(state: AppState) -> anyhow::Result<Self> {
        let client = http::create_telegram_client(&state.config.http)?;
        let bot = Bot::with_client(state.config.telegram.0.clone(), client);
        info!("Bot instance created");

        Ok(Self { bot, state })
    }

    pub async fn start(&self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Successfully connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        }

        command::setup_user_commands(&self.bot).await?;

        let bot = self.bot.clone();
        let mut dispatcher = Dispatcher::builder(bot.clone(), get_handler())
            .dependencies(dptree::deps![self.state.clone()])
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build();

        match &self.state.config.webhook {
            Some(webhook) => {
                info!("Listening for webhook updates on {} ({})", webhook.addr, webhook.url);
                let listener = webhooks::axum(bot, webhooks::Options::new(webhook.addr, webhook.url.clone())).await?;
                dispatcher
                    .dispatch_with_listener(
                        listener,
                        LoggingErrorHandler::with_custom_text("An error from the update listener"),
                    )
                    .await;
            }
            None => {
                info!("Polling for updates");
                dispatcher.dispatch().await;
            }
        }

        Ok(())
    }
}
