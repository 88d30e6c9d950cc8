pub mod completion;
pub mod config;
pub mod themes;
pub mod verify;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use themeshot_core::{PagePreview, RunConfig, Theme, ThemeControl};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ControlMode {
    /// Labelled dropdown plus a save button
    Select,
    /// One button per theme, applied on click
    Buttons,
}

/// Options shared by commands that build a run configuration
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// JSON config file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the application under test
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Admin username
    #[arg(long, env = "THEMESHOT_USERNAME")]
    pub username: Option<String>,

    /// Admin password
    #[arg(long, env = "THEMESHOT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Replacement password if the application forces a password change
    #[arg(long, env = "THEMESHOT_NEW_PASSWORD", hide_env_values = true)]
    pub new_password: Option<String>,

    /// Theme to apply, in order (repeatable)
    #[arg(short, long = "theme", value_name = "THEME")]
    pub themes: Vec<Theme>,

    /// Directory for screenshots
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extra page to capture per theme, e.g. public=/en@800 (repeatable)
    #[arg(long = "preview", value_name = "NAME=PATH[@SCROLL]")]
    pub previews: Vec<PagePreview>,

    /// Capture the whole page instead of the viewport
    #[arg(long)]
    pub full_page: bool,

    /// How the settings page exposes theme selection
    #[arg(long, value_enum, value_name = "MODE")]
    pub control: Option<ControlMode>,
}

impl RunArgs {
    /// Defaults, then the config file, then flags
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(new_password) = &self.new_password {
            config.new_password = Some(new_password.clone());
        }
        if !self.themes.is_empty() {
            config.themes = self.themes.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if !self.previews.is_empty() {
            config.previews = self.previews.clone();
        }
        if self.full_page {
            config.full_page = true;
        }
        match self.control {
            Some(ControlMode::Buttons) => config.theme_control = ThemeControl::Buttons,
            Some(ControlMode::Select)
                if !matches!(config.theme_control, ThemeControl::Select { .. }) =>
            {
                config.theme_control = ThemeControl::default();
            }
            _ => {}
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = RunArgs::default().resolve().unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("run.json");
        std::fs::write(
            &path,
            r#"{"base_url": "http://staging:3000", "themes": ["compact"], "theme_control": {"mode": "buttons"}}"#,
        )
        .unwrap();

        let args = RunArgs {
            config: Some(path),
            themes: vec![Theme::Playful, Theme::SinglePage],
            output_dir: Some(PathBuf::from("shots")),
            ..RunArgs::default()
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.base_url, "http://staging:3000");
        assert_eq!(config.themes, vec![Theme::Playful, Theme::SinglePage]);
        assert_eq!(config.output_dir, PathBuf::from("shots"));
        assert_eq!(config.theme_control, ThemeControl::Buttons);
    }

    #[test]
    fn test_select_mode_keeps_custom_labels_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("run.json");
        std::fs::write(
            &path,
            r#"{"theme_control": {"mode": "select", "label": "Appearance", "save_button": "Save", "success_message": "Saved"}}"#,
        )
        .unwrap();

        let args = RunArgs {
            config: Some(path),
            control: Some(ControlMode::Select),
            ..RunArgs::default()
        };
        match args.resolve().unwrap().theme_control {
            ThemeControl::Select { label, .. } => assert_eq!(label, "Appearance"),
            other => panic!("unexpected control {:?}", other),
        }
    }

    #[test]
    fn test_invalid_result_is_rejected() {
        let args = RunArgs {
            base_url: Some("not a url".to_string()),
            ..RunArgs::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_missing_config_file_names_path() {
        let args = RunArgs {
            config: Some(PathBuf::from("/nonexistent/run.json")),
            ..RunArgs::default()
        };
        let err = args.resolve().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/run.json"));
    }
}
