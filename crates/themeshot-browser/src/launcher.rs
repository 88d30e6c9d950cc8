use crate::{CdpDriver, Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

/// Starts Chrome and hands back a driver for the runner
pub struct BrowserLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    headless: bool,
    window_size: (u32, u32),
    request_timeout: Duration,
}

impl BrowserLauncher {
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf) -> Self {
        Self {
            chrome_path,
            profile_path,
            headless: true,
            window_size: (1280, 800),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Upper bound for a single CDP command, navigation included
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Launch Chrome, start the CDP event loop and open a blank page
    pub async fn launch(&self) -> Result<CdpDriver> {
        tracing::info!(
            "Launching Chrome ({}) from {}",
            if self.headless { "headless" } else { "headful" },
            self.chrome_path.display()
        );

        let (browser, mut handler) = Browser::launch(self.build_config()?).await?;

        // The handler must be polled for any command to complete.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
            tracing::debug!("CDP handler finished");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e.into());
            }
        };

        tracing::info!("Chrome ready");
        Ok(CdpDriver::new(browser, page, handler_task))
    }

    fn build_config(&self) -> Result<BrowserConfig> {
        let (width, height) = self.window_size;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(&self.profile_path)
            .window_size(width, height)
            .viewport(None)
            .request_timeout(self.request_timeout)
            .args(self.build_args());

        if !self.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| Error::Browser(format!("Invalid browser configuration: {}", e)))
    }

    /// Extra Chrome flags on top of what chromiumoxide passes itself
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-extensions".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--hide-scrollbars".to_string(),
        ];

        if self.headless {
            args.push("--disable-gpu".to_string());
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> BrowserLauncher {
        BrowserLauncher::new(
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/tmp/profile"),
        )
    }

    #[test]
    fn test_launcher_defaults() {
        let launcher = launcher();
        assert!(launcher.headless);
        assert_eq!(launcher.window_size, (1280, 800));
        assert_eq!(launcher.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_headless_args() {
        let args = launcher().build_args();

        assert!(args.contains(&"--no-first-run".to_string()));
        assert!(args.contains(&"--no-default-browser-check".to_string()));
        assert!(args.contains(&"--hide-scrollbars".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn test_headful_keeps_gpu() {
        let args = launcher().headless(false).window_size(1920, 1080).build_args();
        assert!(!args.contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn test_config_builds() {
        assert!(launcher().build_config().is_ok());
    }
}
