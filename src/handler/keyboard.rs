use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::service::settings::{ChatSettings, SettingsToggle, TwitterStyle};

pub fn toggle_label(toggle: SettingsToggle) -> String {
    t!(format!("settings.toggles.{}", toggle.column())).to_string()
}

pub fn style_label(style: TwitterStyle) -> String {
    t!(format!("settings.styles.{}", style.value())).to_string()
}

pub fn state_mark(enabled: bool) -> &'static str {
    if enabled {
        "✅"
    } else {
        "❌"
    }
}

pub fn get_settings_text(settings: &ChatSettings) -> String {
    let mut lines = vec![t!("settings.title").to_string(), String::new()];
    for toggle in SettingsToggle::ALL {
        lines.push(format!(
            "{} {}",
            state_mark(toggle.is_enabled(settings)),
            toggle_label(toggle)
        ));
    }
    lines.push(t!("settings.twitter_style", style = style_label(settings.tw_style)).to_string());
    lines.join("\n")
}

pub fn get_settings_keyboard(settings: &ChatSettings) -> InlineKeyboardMarkup {
    let mut buttons = SettingsToggle::ALL
        .into_iter()
        .map(|toggle| {
            vec![InlineKeyboardButton::callback(
                format!("{} {}", state_mark(toggle.is_enabled(settings)), toggle_label(toggle)),
                format!("toggle:{}", toggle.column()),
            )]
        })
        .collect::<Vec<_>>();

    buttons.push(
        TwitterStyle::ALL
            .into_iter()
            .map(|style| {
                let label = if style == settings.tw_style {
                    format!("• {}", style_label(style))
                } else {
                    style_label(style)
                };
                InlineKeyboardButton::callback(label, format!("style:{}", style.value()))
            })
            .collect(),
    );

    InlineKeyboardMarkup::new(buttons)
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_settings_keyboard_layout() {
        let markup = get_settings_keyboard(&ChatSettings::new(1));

        assert_eq!(markup.inline_keyboard.len(), 5);
        assert_eq!(
            callback_data(&markup),
            vec![
                "toggle:tt_orig",
                "toggle:tw_orig",
                "toggle:in_orig",
                "toggle:include_link",
                "style:0",
                "style:1",
                "style:2",
            ]
        );
    }
}
