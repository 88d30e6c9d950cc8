use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Appearance presets offered by the admin settings UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    Default,
    Playful,
    Compact,
    SinglePage,
}

impl Theme {
    pub const ALL: [Theme; 4] = [
        Theme::Default,
        Theme::Playful,
        Theme::Compact,
        Theme::SinglePage,
    ];

    /// Machine name stored by the target application
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Playful => "playful",
            Theme::Compact => "compact",
            Theme::SinglePage => "single-page",
        }
    }

    /// Human label rendered on buttons and select options
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Default => "Default",
            Theme::Playful => "Playful",
            Theme::Compact => "Compact",
            Theme::SinglePage => "Single Page",
        }
    }

    /// File name of the screenshot captured for this theme
    pub fn artifact_name(&self) -> String {
        format!("{}-theme.png", self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown theme '{}' (expected one of: {})",
                    s,
                    Theme::ALL
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        assert_eq!(Theme::Default.artifact_name(), "default-theme.png");
        assert_eq!(Theme::SinglePage.artifact_name(), "single-page-theme.png");
    }

    #[test]
    fn test_parse_accepts_label_forms() {
        assert_eq!("playful".parse::<Theme>().unwrap(), Theme::Playful);
        assert_eq!("Single Page".parse::<Theme>().unwrap(), Theme::SinglePage);
        assert_eq!("single_page".parse::<Theme>().unwrap(), Theme::SinglePage);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "neon".parse::<Theme>().unwrap_err();
        assert!(err.contains("unknown theme 'neon'"));
        assert!(err.contains("single-page"));
    }

    #[test]
    fn test_serde_uses_machine_names() {
        let json = serde_json::to_string(&Theme::SinglePage).unwrap();
        assert_eq!(json, "\"single-page\"");
        let theme: Theme = serde_json::from_str("\"compact\"").unwrap();
        assert_eq!(theme, Theme::Compact);
    }
}
