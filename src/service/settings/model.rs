use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use teloxide::types::Chat;

use crate::{platform::Platform, service::ServiceError};

/// How reposted tweets are captioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TwitterStyle {
    /// Source link only
    #[default]
    Link = 0,
    /// Author name linking to the tweet, plus `@username`
    Info = 1,
    /// `Info` followed by the tweet text
    InfoDesc = 2,
}

impl TwitterStyle {
    pub const ALL: [TwitterStyle; 3] = [TwitterStyle::Link, TwitterStyle::Info, TwitterStyle::InfoDesc];

    pub fn value(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for TwitterStyle {
    type Error = ServiceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Link),
            1 => Ok(Self::Info),
            2 => Ok(Self::InfoDesc),
            other => Err(ServiceError::InvalidValue {
                field: "tw_style",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for TwitterStyle {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<i64>().map_err(|_| ServiceError::InvalidValue {
            field: "tw_style",
            value: s.to_string(),
        })?;
        Self::try_from(value)
    }
}

/// Boolean preferences a chat can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsToggle {
    TikTokHd,
    TwitterOrig,
    InstagramOrig,
    IncludeLink,
}

impl SettingsToggle {
    pub const ALL: [SettingsToggle; 4] = [
        SettingsToggle::TikTokHd,
        SettingsToggle::TwitterOrig,
        SettingsToggle::InstagramOrig,
        SettingsToggle::IncludeLink,
    ];

    /// Column in the `chat` table, also used as callback payload.
    pub fn column(self) -> &'static str {
        match self {
            Self::TikTokHd => "tt_orig",
            Self::TwitterOrig => "tw_orig",
            Self::InstagramOrig => "in_orig",
            Self::IncludeLink => "include_link",
        }
    }

    pub fn is_enabled(self, settings: &ChatSettings) -> bool {
        match self {
            Self::TikTokHd => settings.tt_orig,
            Self::TwitterOrig => settings.tw_orig,
            Self::InstagramOrig => settings.in_orig,
            Self::IncludeLink => settings.include_link,
        }
    }
}

impl fmt::Display for SettingsToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for SettingsToggle {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.column() == s)
            .ok_or_else(|| ServiceError::InvalidValue {
                field: "toggle",
                value: s.to_string(),
            })
    }
}

/// One row of the `chat` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub id: i64,
    pub chat_type: String,
    pub name: Option<String>,
    pub chat_link: Option<String>,
    pub last_info: Option<String>,
    pub tw_orig: bool,
    pub tw_style: TwitterStyle,
    pub tt_orig: bool,
    pub in_orig: bool,
    pub include_link: bool,
}

impl ChatSettings {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            chat_type: "private".to_string(),
            name: None,
            chat_link: None,
            last_info: None,
            tw_orig: false,
            tw_style: TwitterStyle::default(),
            tt_orig: false,
            in_orig: false,
            include_link: false,
        }
    }

    /// Whether media from `platform` should be sent in original quality.
    pub fn wants_original(&self, platform: Platform) -> bool {
        match platform {
            Platform::TikTok => self.tt_orig,
            Platform::Twitter => self.tw_orig,
            Platform::Instagram => self.in_orig,
            Platform::YouTube => true,
        }
    }

    pub fn matches(&self, profile: &ChatProfile) -> bool {
        self.chat_type == profile.kind && self.name == profile.name && self.chat_link == profile.link
    }
}

/// What the bot knows about a chat from an incoming update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatProfile {
    pub id: i64,
    pub kind: String,
    pub name: Option<String>,
    pub link: Option<String>,
}

impl ChatProfile {
    pub fn from_chat(chat: &Chat) -> Self {
        let kind = if chat.is_private() {
            "private"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_group() {
            "group"
        } else {
            "channel"
        };

        let name = match chat.title() {
            Some(title) => Some(title.to_string()),
            None => {
                let full = [chat.first_name(), chat.last_name()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                (!full.is_empty()).then_some(full)
            }
        };

        Self {
            id: chat.id.0,
            kind: kind.to_string(),
            name,
            link: chat.username().map(|u| format!("@{}", u)),
        }
    }
}
