use std::future::Future;

use teloxide::{
    prelude::*,
    requests::Request,
    types::{
        InputFile, InputMedia, InputMediaAudio, InputMediaDocument, InputMediaPhoto, InputMediaVideo, MessageId,
        ParseMode, ReplyParameters,
    },
    utils::html,
    RequestError,
};

use crate::config::RetryPolicy;

use super::{Delivery, Outgoing, PlannedItem, SendKind};

/// Runs `op` until it succeeds, honoring Telegram flood waits and retrying
/// network failures after `policy.delay`.
pub async fn send_with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(RequestError::RetryAfter(wait)) if attempt < policy.attempts => {
                warn!("Flood control, retrying in {:?}", wait.duration());
                tokio::time::sleep(wait.duration()).await;
            }
            Err(e @ (RequestError::Network(_) | RequestError::Io(_))) if attempt < policy.attempts => {
                warn!("Telegram request failed (attempt {}/{}): {}", attempt, policy.attempts, e);
                tokio::time::sleep(policy.delay).await;
            }
            result => return result,
        }
        attempt += 1;
    }
}

fn input_media(item: &PlannedItem, caption: Option<&str>) -> InputMedia {
    let file = InputFile::url(item.url.clone());
    macro_rules! with_caption {
        ($media:expr) => {
            match caption {
                Some(c) => $media.caption(c).parse_mode(ParseMode::Html),
                None => $media,
            }
        };
    }

    match item.kind {
        SendKind::Photo => InputMedia::Photo(with_caption!(InputMediaPhoto::new(file))),
        SendKind::Video => InputMedia::Video(with_caption!(InputMediaVideo::new(file))),
        SendKind::Audio => InputMedia::Audio(with_caption!(InputMediaAudio::new(file))),
        SendKind::Document => InputMedia::Document(with_caption!(InputMediaDocument::new(file))),
    }
}

async fn send_single(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    item: &PlannedItem,
    caption: Option<&str>,
    policy: RetryPolicy,
) -> Result<(), RequestError> {
    let reply = ReplyParameters::new(reply_to);

    macro_rules! send {
        ($method:ident) => {
            send_with_retry(policy, || {
                let mut request = bot
                    .$method(chat_id, InputFile::url(item.url.clone()))
                    .reply_parameters(reply.clone());
                if let Some(c) = caption {
                    request = request.caption(c).parse_mode(ParseMode::Html);
                }
                request.send()
            })
            .await?
        };
    }

    match item.kind {
        SendKind::Photo => send!(send_photo),
        SendKind::Video => send!(send_video),
        SendKind::Audio => send!(send_audio),
        SendKind::Document => send!(send_document),
    };
    Ok(())
}

async fn send_text(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    text: &str,
    policy: RetryPolicy,
) -> Result<(), RequestError> {
    send_with_retry(policy, || {
        bot.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_parameters(ReplyParameters::new(reply_to))
            .send()
    })
    .await?;
    Ok(())
}

fn links_text(items: &[PlannedItem], caption: Option<&str>) -> String {
    let links = items
        .iter()
        .map(|i| html::link(i.url.as_str(), &html::escape(i.url.as_str())))
        .collect::<Vec<_>>()
        .join("\n");
    match caption {
        Some(caption) => format!("{}\n\n{}", caption, links),
        None => links,
    }
}

/// Sends every message of `delivery` as replies to `reply_to`. Media Telegram
/// refuses to fetch is replaced by its links.
pub async fn send_delivery(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    delivery: &Delivery,
    policy: RetryPolicy,
) -> Result<(), RequestError> {
    for message in &delivery.messages {
        let result = match message {
            Outgoing::Single { item, caption } => {
                send_single(bot, chat_id, reply_to, item, caption.as_deref(), policy).await
            }
            Outgoing::Album { items, caption } => send_with_retry(policy, || {
                let media = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| input_media(item, if i == 0 { caption.as_deref() } else { None }))
                    .collect::<Vec<_>>();
                bot.send_media_group(chat_id, media)
                    .reply_parameters(ReplyParameters::new(reply_to))
                    .send()
            })
            .await
            .map(|_| ()),
            Outgoing::Text(text) => send_text(bot, chat_id, reply_to, text, policy).await,
        };

        if let Err(e) = result {
            let Some(text) = refused_links(message, &e) else {
                return Err(e);
            };
            warn!("Telegram refused media, sending links instead: {}", e);
            send_text(bot, chat_id, reply_to, &text, policy).await?;
        }
    }
    Ok(())
}

/// Replacement text for media Telegram rejected with an API error.
fn refused_links(message: &Outgoing, error: &RequestError) -> Option<String> {
    if !matches!(error, RequestError::Api(_)) {
        return None;
    }
    match message {
        Outgoing::Single { item, caption } => Some(links_text(std::slice::from_ref(item), caption.as_deref())),
        Outgoing::Album { items, caption } => Some(links_text(items, caption.as_deref())),
        Outgoing::Text(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicU32, Ordering},
            Arc,
        },
        time::Duration,
    };

    use teloxide::{types::Seconds, ApiError};

    use super::*;

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_retry_after_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = send_with_retry(policy(3), || {
            let calls = calls.clone();
            async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(RequestError::RetryAfter(Seconds::from_seconds(0))),
                    _ => Ok(7),
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_api_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = send_with_retry(policy(3), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RequestError::Api(ApiError::BotBlocked))
            }
        })
        .await;

        assert!(matches!(result, Err(RequestError::Api(ApiError::BotBlocked))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = send_with_retry(policy(2), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RequestError::RetryAfter(Seconds::from_seconds(0)))
            }
        })
        .await;

        assert!(matches!(result, Err(RequestError::RetryAfter(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    fn item(kind: SendKind, name: &str) -> PlannedItem {
        PlannedItem {
            kind,
            url: url::Url::parse(&format!("https://cdn.example.com/{}", name)).unwrap(),
        }
    }

    #[test]
    fn test_refused_media_degrades_to_links() {
        let refused = RequestError::Api(ApiError::Unknown("Bad Request: failed to get HTTP URL content".into()));
        let single = Outgoing::Single {
            item: item(SendKind::Video, "clip.mp4"),
            caption: Some("<b>caption</b>".to_string()),
        };

        assert_eq!(
            refused_links(&single, &refused).as_deref(),
            Some("<b>caption</b>\n\n<a href=\"https://cdn.example.com/clip.mp4\">https://cdn.example.com/clip.mp4</a>")
        );

        let album = Outgoing::Album {
            items: vec![item(SendKind::Photo, "1.jpg"), item(SendKind::Photo, "2.jpg")],
            caption: None,
        };
        let text = refused_links(&album, &refused).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("https://cdn.example.com/2.jpg"));
    }

    #[test]
    fn test_transport_errors_are_not_degraded() {
        let single = Outgoing::Single {
            item: item(SendKind::Photo, "1.jpg"),
            caption: None,
        };
        let flood = RequestError::RetryAfter(Seconds::from_seconds(5));

        assert_eq!(refused_links(&single, &flood), None);
        assert_eq!(
            refused_links(&Outgoing::Text("hi".into()), &RequestError::Api(ApiError::BotBlocked)),
            None
        );
    }
}
