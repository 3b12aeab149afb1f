use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub header_bg: String,
    pub header_fg: String,
    pub accent: String,
    pub accent_alt: String,
    pub card_bg: String,
    pub card_fg: String,
    pub correct: String,
    pub incorrect: String,
    pub timer_bg: String,
    pub timer_fg: String,
    pub timer_warn: String,
    pub border: String,
    pub bar_filled: String,
    pub bar_empty: String,
}

fn parse(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return Color::Rgb(r, g, b);
        }
    }
    Color::Reset
}

impl ThemeColors {
    pub fn bg(&self) -> Color {
        parse(&self.bg)
    }
    pub fn fg(&self) -> Color {
        parse(&self.fg)
    }
    pub fn muted(&self) -> Color {
        parse(&self.muted)
    }
    pub fn header_bg(&self) -> Color {
        parse(&self.header_bg)
    }
    pub fn header_fg(&self) -> Color {
        parse(&self.header_fg)
    }
    pub fn accent(&self) -> Color {
        parse(&self.accent)
    }
    pub fn accent_alt(&self) -> Color {
        parse(&self.accent_alt)
    }
    pub fn card_bg(&self) -> Color {
        parse(&self.card_bg)
    }
    pub fn card_fg(&self) -> Color {
        parse(&self.card_fg)
    }
    pub fn correct(&self) -> Color {
        parse(&self.correct)
    }
    pub fn incorrect(&self) -> Color {
        parse(&self.incorrect)
    }
    pub fn timer_bg(&self) -> Color {
        parse(&self.timer_bg)
    }
    pub fn timer_fg(&self) -> Color {
        parse(&self.timer_fg)
    }
    pub fn timer_warn(&self) -> Color {
        parse(&self.timer_warn)
    }
    pub fn border(&self) -> Color {
        parse(&self.border)
    }
    pub fn bar_filled(&self) -> Color {
        parse(&self.bar_filled)
    }
    pub fn bar_empty(&self) -> Color {
        parse(&self.bar_empty)
    }
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // User themes take precedence over the bundled ones.
        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir
                .join("phonodrill")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_path) {
                if let Ok(theme) = toml::from_str::<Theme>(&content) {
                    return Some(theme);
                }
            }
        }

        let file = ThemeAssets::get(&format!("{name}.toml"))?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("sky").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_themes_parse() {
        let themes = Theme::available_themes();
        assert!(themes.contains(&"sky".to_string()));
        for name in themes {
            let theme = Theme::load(&name).expect("bundled theme must load");
            assert_ne!(theme.colors.accent(), Color::Reset);
        }
    }

    #[test]
    fn hex_parsing_is_lenient() {
        assert_eq!(parse("#4d79ff"), Color::Rgb(0x4d, 0x79, 0xff));
        assert_eq!(parse("4d79ff"), Color::Rgb(0x4d, 0x79, 0xff));
        assert_eq!(parse("nonsense"), Color::Reset);
    }
}
