use teloxide::dptree;
use teloxide_tests::{MockBot, MockCallbackQuery, MockMessageText};

use crate::handler::get_handler;
use crate::service::settings::{ChatSettings, SettingsToggle, TwitterStyle};
use crate::utils::test::{setup_test_bot, setup_test_state};

async fn settings_of(state: &crate::state::AppState, chat_id: i64) -> ChatSettings {
    state.settings.get(chat_id).await.unwrap()
}

#[tokio::test]
async fn test_start_command() {
    let (bot, _state) = setup_test_bot("/start").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    let text = message.text().unwrap();
    assert!(text.starts_with("Hi! Send me a link from TikTok, Twitter and"));
}

#[tokio::test]
async fn test_help_command() {
    let (bot, _state) = setup_test_bot("/help").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert_eq!(message.text(), Some(t!("commands.help").as_ref()));
}

#[tokio::test]
async fn test_first_contact_registers_chat() {
    let (bot, state) = setup_test_bot("/start").await;

    bot.dispatch().await;

    let chat_id = bot.get_responses().sent_messages[0].chat.id.0;
    let settings = settings_of(&state, chat_id).await;
    assert_eq!(settings.chat_type, "private");
    assert_eq!(settings.tw_style, TwitterStyle::Link);
}

#[tokio::test]
async fn test_toggle_command_flips_setting() {
    let (bot, state) = setup_test_bot("/tiktok_hd").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert_eq!(message.text(), Some("✅ TikTok HD"));

    let settings = settings_of(&state, message.chat.id.0).await;
    assert!(SettingsToggle::TikTokHd.is_enabled(&settings));
    assert!(!settings.tw_orig);
}

#[tokio::test]
async fn test_twitter_style_command() {
    let (bot, state) = setup_test_bot("/twitter_style 2").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert_eq!(message.text(), Some("Twitter style set to Info + text"));
    assert_eq!(
        settings_of(&state, message.chat.id.0).await.tw_style,
        TwitterStyle::InfoDesc
    );
}

#[tokio::test]
async fn test_twitter_style_rejects_unknown_value() {
    let (bot, state) = setup_test_bot("/twitter_style 7").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert!(message.text().unwrap().starts_with("Unknown Twitter style: 7"));
    assert_eq!(
        settings_of(&state, message.chat.id.0).await.tw_style,
        TwitterStyle::Link
    );
}

#[tokio::test]
async fn test_message_without_links_is_ignored() {
    let (bot, _state) = setup_test_bot("nice weather today").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    assert!(responses.sent_messages.is_empty());
}

#[tokio::test]
async fn test_tiktok_link_is_relayed() {
    let (bot, state) = setup_test_bot("look https://www.tiktok.com/@someone/video/7234567890123456789").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    assert_eq!(responses.sent_messages_video.len(), 1);
    assert!(responses.sent_messages_text.is_empty());

    let chat_id = responses.sent_messages[0].chat.id.0;
    assert_eq!(
        settings_of(&state, chat_id).await.last_info.as_deref(),
        Some("https://m.tiktok.com/v/7234567890123456789")
    );
}

#[tokio::test]
async fn test_unresolvable_link_gets_not_found_reply() {
    let (bot, state) = setup_test_bot("https://twitter.com/someone/status/1234567890").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert_eq!(message.text(), Some(t!("messages.not_found").as_ref()));
    assert_eq!(settings_of(&state, message.chat.id.0).await.last_info, None);
}

#[tokio::test]
async fn test_unsupported_platform_gets_error_reply() {
    // The test registry knows no Instagram platform
    let (bot, state) = setup_test_bot("https://www.instagram.com/p/CdPmRmjJ7aB/").await;

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert_eq!(message.text(), Some(t!("messages.error").as_ref()));
    assert_eq!(settings_of(&state, message.chat.id.0).await.last_info, None);
}

#[tokio::test]
async fn test_settings_callbacks_update_chat() {
    let state = setup_test_state().await;
    let settings_message = MockMessageText::new().text("Settings of this chat").build();
    let chat_id = settings_message.chat.id.0;

    let bot = MockBot::new(
        MockCallbackQuery::new()
            .data("toggle:tw_orig")
            .message(settings_message.clone()),
        get_handler(),
    );
    bot.dependencies(dptree::deps![state.clone()]);
    bot.dispatch().await;

    let responses = bot.get_responses();
    assert_eq!(responses.answered_callback_queries.len(), 1);
    let edited = responses.edited_messages_text.last().expect("Settings message was not edited");
    assert!(edited.message.text().unwrap().contains("✅ Twitter original"));
    assert!(settings_of(&state, chat_id).await.tw_orig);

    bot.update(
        MockCallbackQuery::new()
            .data("style:1")
            .message(settings_message),
    );
    bot.dispatch().await;

    assert_eq!(settings_of(&state, chat_id).await.tw_style, TwitterStyle::Info);
    let responses = bot.get_responses();
    let edited = responses.edited_messages_text.last().expect("Settings message was not edited");
    assert!(edited.message.text().unwrap().contains("Twitter style: Info"));
}
