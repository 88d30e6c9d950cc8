use crate::error::ConfigError;
use crate::theme::Theme;
use crate::wait::{Backoff, WaitPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const REDACTED: &str = "********";
const MIN_PASSWORD_LEN: usize = 6;

/// Everything a verification run needs to know about the target application.
///
/// Deserialized with `#[serde(default)]` so a config file only has to name
/// the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Replacement password used when the target forces a password change
    pub new_password: Option<String>,
    pub themes: Vec<Theme>,
    pub output_dir: PathBuf,
    pub full_page: bool,
    pub routes: Routes,
    pub labels: Labels,
    pub theme_control: ThemeControl,
    pub previews: Vec<PagePreview>,
    pub timeouts: Timeouts,
    pub backoff: Backoff,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            username: "fonok".to_string(),
            password: "abc123".to_string(),
            new_password: None,
            themes: vec![Theme::Default, Theme::Playful],
            output_dir: PathBuf::from("."),
            full_page: false,
            routes: Routes::default(),
            labels: Labels::default(),
            theme_control: ThemeControl::default(),
            previews: Vec::new(),
            timeouts: Timeouts::default(),
            backoff: Backoff::default(),
        }
    }
}

impl RunConfig {
    /// Load a JSON config file, filling missing fields with defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base()?;

        if self.themes.is_empty() {
            return Err(ConfigError::Invalid("theme list is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for theme in &self.themes {
            if !seen.insert(theme) {
                return Err(ConfigError::Invalid(format!(
                    "theme '{}' listed more than once",
                    theme
                )));
            }
        }

        if self.username.trim().is_empty() {
            return Err(ConfigError::Invalid("username is empty".to_string()));
        }

        if let Some(new_password) = &self.new_password {
            if new_password.chars().count() < MIN_PASSWORD_LEN {
                return Err(ConfigError::Invalid(format!(
                    "new password must be at least {} characters",
                    MIN_PASSWORD_LEN
                )));
            }
            if *new_password == self.password {
                return Err(ConfigError::Invalid(
                    "new password must differ from the current password".to_string(),
                ));
            }
        }

        for (name, route) in [
            ("login", &self.routes.login),
            ("dashboard", &self.routes.dashboard),
            ("change_password", &self.routes.change_password),
            ("settings", &self.routes.settings),
        ] {
            check_route(route)
                .map_err(|e| ConfigError::Invalid(format!("route {}: {}", name, e)))?;
        }

        let mut names = HashSet::new();
        for preview in &self.previews {
            preview.validate().map_err(ConfigError::Invalid)?;
            if !names.insert(preview.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "preview '{}' listed more than once",
                    preview.name
                )));
            }
        }

        self.timeouts.validate()?;
        self.backoff.validate()
    }

    fn base(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        // Routes are absolute paths; a base path would be dropped on join.
        if url.path() != "/" {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("must be an origin without a path, found '{}'", url.path()),
            });
        }

        Ok(url)
    }

    /// Absolute URL of an application route
    pub fn url_for(&self, route: &str) -> Result<String, ConfigError> {
        let url = self
            .base()?
            .join(route)
            .map_err(|e| ConfigError::Invalid(format!("bad route '{}': {}", route, e)))?;
        Ok(url.to_string())
    }

    /// Copy safe to print or serialize into reports
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.password = REDACTED.to_string();
        if config.new_password.is_some() {
            config.new_password = Some(REDACTED.to_string());
        }
        config
    }

    pub fn wait(&self, timeout: Duration) -> WaitPolicy {
        WaitPolicy::new(timeout, self.backoff)
    }
}

/// Routes and preview paths must stay on the application origin
fn check_route(path: &str) -> Result<(), String> {
    if !path.starts_with('/') || path.starts_with("//") || path.contains('\\') {
        return Err(format!("path '{}' must start with a single '/'", path));
    }
    Ok(())
}

/// Does `url` point at `route` (ignoring query, fragment and trailing slash)
pub fn path_matches(url: &str, route: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let expected = route.split(['?', '#']).next().unwrap_or(route);
    parsed.path().trim_end_matches('/') == expected.trim_end_matches('/')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub login: String,
    pub dashboard: String,
    pub change_password: String,
    pub settings: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/fonok".to_string(),
            dashboard: "/fonok/dashboard".to_string(),
            change_password: "/fonok/change-password".to_string(),
            settings: "/fonok/settings".to_string(),
        }
    }
}

/// Accessible names the runner looks for in the rendered pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub username: String,
    pub password: String,
    pub sign_in: String,
    pub landing_heading: String,
    pub rotation_heading: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub change_password_button: String,
    pub settings_heading: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            username: "Username".to_string(),
            password: "Password".to_string(),
            sign_in: "Sign in".to_string(),
            landing_heading: "Dashboard".to_string(),
            rotation_heading: "Change Password".to_string(),
            current_password: "Current Password".to_string(),
            new_password: "New Password".to_string(),
            confirm_password: "Confirm New Password".to_string(),
            change_password_button: "Change Password".to_string(),
            settings_heading: "Site Settings".to_string(),
        }
    }
}

/// How the settings page exposes theme selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThemeControl {
    /// Labelled select, explicit save, confirmation message
    Select {
        label: String,
        save_button: String,
        success_message: String,
    },
    /// One button per theme named by its label, applied on click
    Buttons,
}

impl Default for ThemeControl {
    fn default() -> Self {
        ThemeControl::Select {
            label: "Theme selection".to_string(),
            save_button: "Save Settings".to_string(),
            success_message: "Settings saved successfully!".to_string(),
        }
    }
}

/// Per-step wait bounds in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Form fields and buttons becoming available
    pub field_ms: u64,
    /// Login outcome: dashboard or change-password prompt
    pub landing_ms: u64,
    /// Change-password form rendering once the prompt is detected
    pub rotation_probe_ms: u64,
    /// Network quiescence after a navigation
    pub navigation_ms: u64,
    /// Save confirmation message
    pub confirmation_ms: u64,
    /// Rendering settle before a screenshot
    pub settle_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            field_ms: 10_000,
            landing_ms: 10_000,
            rotation_probe_ms: 5_000,
            navigation_ms: 30_000,
            confirmation_ms: 10_000,
            settle_ms: 3_000,
        }
    }
}

impl Timeouts {
    pub fn field(&self) -> Duration {
        Duration::from_millis(self.field_ms)
    }

    pub fn landing(&self) -> Duration {
        Duration::from_millis(self.landing_ms)
    }

    pub fn rotation_probe(&self) -> Duration {
        Duration::from_millis(self.rotation_probe_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn confirmation(&self) -> Duration {
        Duration::from_millis(self.confirmation_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            ("field_ms", self.field_ms),
            ("landing_ms", self.landing_ms),
            ("rotation_probe_ms", self.rotation_probe_ms),
            ("navigation_ms", self.navigation_ms),
            ("confirmation_ms", self.confirmation_ms),
        ];
        for (name, value) in all {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("timeout {} must be > 0", name)));
            }
        }
        Ok(())
    }
}

/// Extra page captured once per theme, e.g. `public=/en@800`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePreview {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<u32>,
}

impl PagePreview {
    pub fn artifact_name(&self, theme: Theme) -> String {
        format!("{}-{}.png", self.name, theme.as_str())
    }

    /// Names end up in file names, paths are joined onto the base URL
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "preview name '{}' must be non-empty and use only letters, digits, '-' or '_'",
                self.name
            ));
        }
        check_route(&self.path).map_err(|e| format!("preview '{}': {}", self.name, e))
    }
}

impl FromStr for PagePreview {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=PATH[@SCROLL], got '{}'", s))?;
        let (path, scroll_y) = match rest.rsplit_once('@') {
            Some((path, scroll)) => {
                let scroll = scroll
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| format!("invalid scroll offset '{}'", scroll))?;
                (path, Some(scroll))
            }
            None => (rest, None),
        };

        let preview = Self {
            name: name.trim().to_string(),
            path: path.trim().to_string(),
            scroll_y,
        };
        preview.validate()?;
        Ok(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RunConfig::default();
        config.validate().unwrap();
        assert_eq!(config.themes, vec![Theme::Default, Theme::Playful]);
        assert_eq!(config.username, "fonok");
    }

    #[test]
    fn test_partial_json_overlays_defaults() {
        let json = r#"{
            "base_url": "http://127.0.0.1:4000",
            "themes": ["compact", "single-page"],
            "timeouts": { "landing_ms": 2500 },
            "theme_control": { "mode": "buttons" }
        }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:4000");
        assert_eq!(config.themes, vec![Theme::Compact, Theme::SinglePage]);
        assert_eq!(config.timeouts.landing_ms, 2500);
        assert_eq!(config.timeouts.field_ms, 10_000);
        assert_eq!(config.theme_control, ThemeControl::Buttons);
        assert_eq!(config.routes, Routes::default());
    }

    #[test]
    fn test_from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"username": "editor"}"#).unwrap();

        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.username, "editor");
        assert_eq!(config.password, "abc123");
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = RunConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = RunConfig {
            base_url: "localhost:3000".to_string(),
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        let config = RunConfig {
            base_url: "ftp://example.com".to_string(),
            ..RunConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_validate_rejects_empty_and_duplicate_themes() {
        let config = RunConfig {
            themes: vec![],
            ..RunConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("empty"));

        let config = RunConfig {
            themes: vec![Theme::Playful, Theme::Playful],
            ..RunConfig::default()
        };
        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("more than once")
        );
    }

    #[test]
    fn test_validate_checks_new_password() {
        let short = RunConfig {
            new_password: Some("abc".to_string()),
            ..RunConfig::default()
        };
        assert!(short.validate().unwrap_err().to_string().contains("at least 6"));

        let same = RunConfig {
            new_password: Some("abc123".to_string()),
            ..RunConfig::default()
        };
        assert!(same.validate().unwrap_err().to_string().contains("differ"));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = RunConfig::default();
        config.timeouts.navigation_ms = 0;
        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("navigation_ms")
        );
    }

    #[test]
    fn test_url_for_joins_routes() {
        let config = RunConfig::default();
        assert_eq!(
            config.url_for("/fonok/settings").unwrap(),
            "http://localhost:3000/fonok/settings"
        );
    }

    #[test]
    fn test_path_matches_ignores_trailing_slash_and_query() {
        assert!(path_matches(
            "http://localhost:3000/fonok/dashboard/?tab=1",
            "/fonok/dashboard"
        ));
        assert!(!path_matches(
            "http://localhost:3000/fonok/change-password",
            "/fonok/dashboard"
        ));
        assert!(!path_matches("about:blank", "/fonok"));
    }

    #[test]
    fn test_redacted_hides_passwords() {
        let config = RunConfig {
            new_password: Some("s3cret!".to_string()),
            ..RunConfig::default()
        };
        let redacted = config.redacted();
        assert_eq!(redacted.password, REDACTED);
        assert_eq!(redacted.new_password.as_deref(), Some(REDACTED));
        assert_eq!(redacted.username, config.username);
    }

    #[test]
    fn test_preview_parsing() {
        let preview: PagePreview = "public=/en@800".parse().unwrap();
        assert_eq!(preview.name, "public");
        assert_eq!(preview.path, "/en");
        assert_eq!(preview.scroll_y, Some(800));
        assert_eq!(preview.artifact_name(Theme::SinglePage), "public-single-page.png");

        let preview: PagePreview = "admin=/fonok/dashboard".parse().unwrap();
        assert_eq!(preview.scroll_y, None);
    }

    #[test]
    fn test_preview_parsing_errors() {
        assert!("public".parse::<PagePreview>().is_err());
        assert!("=/en".parse::<PagePreview>().is_err());
        assert!("public=en".parse::<PagePreview>().is_err());
        assert!("public=/en@far".parse::<PagePreview>().is_err());
        assert!("../x=/en".parse::<PagePreview>().is_err());
        assert!("public=//evil.example/x".parse::<PagePreview>().is_err());
    }

    #[test]
    fn test_validate_rejects_previews_from_file() {
        let json = r#"{"previews": [{"name": "/tmp/evil", "path": "/en"}]}"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("/tmp/evil"));

        let json = r#"{"previews": [{"name": "public", "path": "https://elsewhere.example/x"}]}"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());

        let json = r#"{"previews": [{"name": "public", "path": "//elsewhere.example/x"}]}"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_off_origin_routes() {
        let mut config = RunConfig::default();
        config.routes.settings = "https://elsewhere.example/settings".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("settings"));
    }

    #[test]
    fn test_validate_rejects_base_url_with_path() {
        let config = RunConfig {
            base_url: "http://host/app".to_string(),
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        let config = RunConfig {
            base_url: "http://host:3000/".to_string(),
            ..RunConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_backoff() {
        let config = RunConfig {
            backoff: Backoff::Fixed { interval_ms: 0 },
            ..RunConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("interval_ms"));

        let config = RunConfig {
            backoff: Backoff::Exponential {
                initial_ms: 0,
                max_ms: 1_000,
                factor: 2,
            },
            ..RunConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("initial_ms"));
    }
}
