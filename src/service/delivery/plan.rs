use teloxide::utils::html;
use url::Url;

use crate::{
    config::LimitsConfig,
    platform::{MediaFile, MediaFileItem, MediaType, Platform},
    service::settings::{ChatSettings, TwitterStyle},
};

/// Telegram's album size limit.
pub const ALBUM_SIZE: usize = 10;
const CAPTION_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    Photo,
    Video,
    Audio,
    Document,
}

impl SendKind {
    fn group(self) -> u8 {
        match self {
            SendKind::Photo | SendKind::Video => 0,
            SendKind::Audio => 1,
            SendKind::Document => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub kind: SendKind,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Single { item: PlannedItem, caption: Option<String> },
    Album { items: Vec<PlannedItem>, caption: Option<String> },
    /// Media too large to upload by url, sent as plain links.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub messages: Vec<Outgoing>,
}

struct Variant<'a> {
    url: &'a Url,
    size: Option<u64>,
    kind: SendKind,
}

/// Decides how `media` is sent to a chat with `settings`.
pub fn plan(media: &MediaFile, settings: &ChatSettings, limits: &LimitsConfig) -> Delivery {
    let original = settings.wants_original(media.platform);

    let mut planned: Vec<PlannedItem> = Vec::new();
    let mut oversized: Vec<&Url> = Vec::new();

    for item in &media.items {
        match choose_variant(item, original, limits) {
            Some(item) => planned.push(item),
            None => oversized.push(preferred_url(item, original)),
        }
    }

    let mut caption = build_caption(media, settings);
    let mut messages = Vec::new();

    for group in group_items(planned) {
        for chunk in group.chunks(ALBUM_SIZE) {
            let caption = caption.take();
            let message = match chunk {
                [item] => Outgoing::Single {
                    item: item.clone(),
                    caption,
                },
                items => Outgoing::Album {
                    items: items.to_vec(),
                    caption,
                },
            };
            messages.push(message);
        }
    }

    if !oversized.is_empty() {
        let links = oversized
            .iter()
            .map(|url| html::link(url.as_str(), &html::escape(url.as_str())))
            .collect::<Vec<_>>()
            .join("\n");
        let text = match caption.take() {
            Some(caption) => format!("{}\n\n{}", caption, links),
            None => links,
        };
        messages.push(Outgoing::Text(text));
    }

    Delivery { messages }
}

fn preferred_url(item: &MediaFileItem, original: bool) -> &Url {
    match (&item.original_url, original) {
        (Some(url), true) => url,
        _ => &item.url,
    }
}

fn choose_variant(item: &MediaFileItem, original: bool, limits: &LimitsConfig) -> Option<PlannedItem> {
    let standard_kind = match item.media_type {
        MediaType::Image => SendKind::Photo,
        MediaType::Video => SendKind::Video,
        MediaType::Audio => SendKind::Audio,
    };
    // Uncompressed images go out as documents
    let original_kind = match item.media_type {
        MediaType::Image => SendKind::Document,
        _ => standard_kind,
    };

    let standard = Variant {
        url: &item.url,
        size: item.size,
        kind: standard_kind,
    };
    let original_variant = Variant {
        url: item.original_url.as_ref().unwrap_or(&item.url),
        size: if item.original_url.is_some() {
            item.original_size
        } else {
            item.size
        },
        kind: original_kind,
    };

    let candidates = if original {
        [original_variant, standard]
    } else {
        [standard, original_variant]
    };

    candidates
        .into_iter()
        .find(|variant| fits(variant, limits))
        .map(|variant| PlannedItem {
            kind: variant.kind,
            url: variant.url.clone(),
        })
}

fn fits(variant: &Variant, limits: &LimitsConfig) -> bool {
    let limit = match variant.kind {
        SendKind::Photo => limits.photo_bytes,
        _ => limits.file_bytes,
    };
    match variant.size {
        Some(size) if size > 0 => size <= limit,
        // Unknown sizes are left to Telegram
        _ => true,
    }
}

/// Splits items into runs that may share an album, keeping their order.
fn group_items(items: Vec<PlannedItem>) -> Vec<Vec<PlannedItem>> {
    let mut groups: Vec<Vec<PlannedItem>> = Vec::new();
    for item in items {
        match groups.last_mut() {
            Some(group) if group[0].kind.group() == item.kind.group() => group.push(item),
            _ => groups.push(vec![item]),
        }
    }
    groups
}

/// Caption html plus the length of its text as Telegram counts it.
struct CaptionLine {
    html: String,
    visible: usize,
}

fn build_caption(media: &MediaFile, settings: &ChatSettings) -> Option<String> {
    let source_link = || source_line(media).html;

    match media.platform {
        Platform::Twitter => match settings.tw_style {
            TwitterStyle::Link => settings.include_link.then(source_link),
            TwitterStyle::Info => Some(author_line(media).html),
            TwitterStyle::InfoDesc => {
                let line = author_line(media);
                let mut caption = line.html;
                if let Some(description) = media.description.as_deref().filter(|d| !d.trim().is_empty()) {
                    let budget = CAPTION_LIMIT.saturating_sub(line.visible + 2);
                    if budget > 0 {
                        caption.push_str("\n\n");
                        caption.push_str(&html::escape(&truncate(description, budget)));
                    }
                }
                Some(caption)
            }
        },
        _ => settings.include_link.then(source_link),
    }
}

fn source_line(media: &MediaFile) -> CaptionLine {
    CaptionLine {
        html: html::link(&media.source, &html::escape(&media.source)),
        visible: media.source.chars().count(),
    }
}

fn author_line(media: &MediaFile) -> CaptionLine {
    let Some(author) = &media.author else {
        return source_line(media);
    };
    let name = author.name.as_deref().unwrap_or(&author.username);
    CaptionLine {
        html: format!(
            "{} (@{})",
            html::link(&media.source, &html::escape(name)),
            html::escape(&author.username)
        ),
        visible: name.chars().count() + author.username.chars().count() + 4,
    }
}

/// Cuts plain `text` to at most `limit` characters, marking the cut with an ellipsis.
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
