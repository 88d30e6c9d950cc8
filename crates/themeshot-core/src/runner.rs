//! The verification flow: log in, handle a forced password change, open the
//! settings page, then apply and capture each theme in order.
//!
//! The first failing step ends the run. The runner then attempts one error
//! screenshot and closes the browser session; `run` consumes the runner so the
//! session is closed exactly once.

use crate::artifact::{Artifact, ArtifactKind, ArtifactWriter, ERROR_ARTIFACT};
use crate::config::{PagePreview, RunConfig, ThemeControl, path_matches};
use crate::driver::{Driver, DriverError};
use crate::error::{Result, Step, VerifyError};
use crate::report::{FailureSummary, RunReport};
use crate::theme::Theme;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Where the login form sent us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    Dashboard,
    RotationRequired,
}

pub struct VerificationRunner<D: Driver> {
    config: RunConfig,
    driver: D,
    writer: ArtifactWriter,
    artifacts: Vec<Artifact>,
}

impl<D: Driver> VerificationRunner<D> {
    /// Create a runner over an open browser session.
    ///
    /// `config` is expected to have passed [`RunConfig::validate`].
    pub fn new(config: RunConfig, driver: D) -> Self {
        let writer = ArtifactWriter::new(config.output_dir.clone());
        Self {
            config,
            driver,
            writer,
            artifacts: Vec::new(),
        }
    }

    /// Execute the whole flow and close the session
    pub async fn run(mut self) -> RunReport {
        let started_at = Utc::now();
        info!(
            "Verifying {} theme(s) against {}",
            self.config.themes.len(),
            self.config.base_url
        );

        let outcome = self.execute().await;

        let (failure, error_artifact) = match &outcome {
            Ok(()) => {
                info!("Verification run completed: {} artifact(s)", self.artifacts.len());
                (None, None)
            }
            Err(err) => {
                error!("Verification run failed: {}", err);
                (Some(FailureSummary::from(err)), self.capture_error().await)
            }
        };

        self.teardown().await;

        RunReport {
            base_url: self.config.base_url.clone(),
            themes: self.config.themes.clone(),
            started_at,
            finished_at: Utc::now(),
            artifacts: self.artifacts,
            failure,
            error_artifact,
        }
    }

    async fn execute(&mut self) -> Result<()> {
        self.authenticate().await?;

        let themes = self.config.themes.clone();
        for theme in themes {
            // A fresh settings page per theme, so a confirmation left over
            // from the previous save cannot satisfy the next one.
            self.open_settings().await?;
            self.apply_theme(theme).await?;
            self.capture_theme(theme).await?;

            let previews = self.config.previews.clone();
            for preview in &previews {
                self.capture_preview(theme, preview).await?;
            }
        }

        Ok(())
    }

    async fn authenticate(&mut self) -> Result<()> {
        let step = Step::Authenticate;
        let labels = self.config.labels.clone();
        let login = self.config.routes.login.clone();
        let username = self.config.username.clone();
        let password = self.config.password.clone();

        info!("Logging in as '{}'", username);
        self.goto(&step, &login).await?;
        self.wait_network_idle(&step).await?;

        self.fill(&step, &labels.username, &username).await?;
        self.fill(&step, &labels.password, &password).await?;
        self.click(&step, &labels.sign_in).await?;

        match self.await_landing().await? {
            Landing::Dashboard => {
                info!("Login successful, no password change requested");
                Ok(())
            }
            Landing::RotationRequired => self.rotate_credentials().await,
        }
    }

    /// Wait until the app shows either the dashboard or the change-password
    /// prompt. Both are positive signals; neither within the bound is a failed
    /// login.
    async fn await_landing(&mut self) -> Result<Landing> {
        let step = Step::Authenticate;
        let routes = self.config.routes.clone();
        let labels = self.config.labels.clone();
        let timeout = self.config.timeouts.landing();
        let mut poller = self.config.wait(timeout).start();

        loop {
            if let Some(url) = self.driver.current_url().await.map_err(driver_err(&step))? {
                if path_matches(&url, &routes.change_password) {
                    return Ok(Landing::RotationRequired);
                }
                if path_matches(&url, &routes.dashboard) {
                    return Ok(Landing::Dashboard);
                }
            }
            if self
                .driver
                .heading_visible(&labels.rotation_heading)
                .await
                .map_err(driver_err(&step))?
            {
                return Ok(Landing::RotationRequired);
            }
            if self
                .driver
                .heading_visible(&labels.landing_heading)
                .await
                .map_err(driver_err(&step))?
            {
                return Ok(Landing::Dashboard);
            }

            if !poller.tick().await {
                return Err(VerifyError::AuthenticationFailed {
                    step,
                    detail: format!(
                        "neither '{}' nor '{}' appeared within {}ms of signing in",
                        labels.landing_heading,
                        labels.rotation_heading,
                        timeout.as_millis()
                    ),
                });
            }
        }
    }

    async fn rotate_credentials(&mut self) -> Result<()> {
        let step = Step::RotateCredentials;
        let labels = self.config.labels.clone();

        let Some(new_password) = self.config.new_password.clone() else {
            return Err(VerifyError::UnexpectedState {
                step,
                detail: "the application requires a password change but no new password is configured"
                    .to_string(),
            });
        };
        info!("Password change requested for '{}'", self.config.username);

        let probe = self.config.timeouts.rotation_probe();
        if !self.wait_for_field(&step, &labels.new_password, probe).await? {
            return Err(VerifyError::AssertionFailed {
                step,
                expected: format!("field '{}' on the change-password form", labels.new_password),
                timeout: probe,
            });
        }

        // A forced change hides the current password field.
        if self
            .driver
            .field_present(&labels.current_password)
            .await
            .map_err(driver_err(&step))?
        {
            let current = self.config.password.clone();
            self.fill(&step, &labels.current_password, &current).await?;
        }
        self.fill(&step, &labels.new_password, &new_password).await?;
        self.fill(&step, &labels.confirm_password, &new_password).await?;
        self.click(&step, &labels.change_password_button).await?;

        let landing = self.config.timeouts.landing();
        if !self.wait_for_heading(&step, &labels.landing_heading, landing).await? {
            return Err(VerifyError::AuthenticationFailed {
                step,
                detail: format!(
                    "'{}' not shown within {}ms of changing the password",
                    labels.landing_heading,
                    landing.as_millis()
                ),
            });
        }

        warn!(
            "Password for '{}' was changed; use the new password for later runs",
            self.config.username
        );
        Ok(())
    }

    async fn open_settings(&mut self) -> Result<()> {
        let step = Step::OpenSettings;
        let route = self.config.routes.settings.clone();
        let heading = self.config.labels.settings_heading.clone();

        debug!("Opening settings page {}", route);
        self.goto(&step, &route).await?;
        self.wait_network_idle(&step).await?;
        self.expect_heading(&step, &heading, self.config.timeouts.field())
            .await
    }

    async fn apply_theme(&mut self, theme: Theme) -> Result<()> {
        let step = Step::ApplyTheme(theme);
        info!("Applying {} theme", theme);

        match self.config.theme_control.clone() {
            ThemeControl::Select {
                label,
                save_button,
                success_message,
            } => {
                self.select(&step, &label, theme.as_str()).await?;
                self.click(&step, &save_button).await?;
                self.expect_text(&step, &success_message, self.config.timeouts.confirmation())
                    .await?;
            }
            ThemeControl::Buttons => {
                self.click(&step, theme.label()).await?;
                self.wait_network_idle(&step).await?;
            }
        }

        Ok(())
    }

    async fn capture_theme(&mut self, theme: Theme) -> Result<()> {
        let name = theme.artifact_name();
        let step = Step::Capture(name.clone());

        self.settle(&step).await?;
        let artifact = self.screenshot(&step, ArtifactKind::Theme, &name).await?;
        info!("Captured {} theme: {}", theme, artifact.path.display());
        Ok(())
    }

    async fn capture_preview(&mut self, theme: Theme, preview: &PagePreview) -> Result<()> {
        let step = Step::Preview(preview.name.clone());
        let name = preview.artifact_name(theme);

        self.goto(&step, &preview.path).await?;
        self.wait_network_idle(&step).await?;
        self.settle(&step).await?;
        if let Some(y) = preview.scroll_y {
            self.driver.scroll_to(y).await.map_err(driver_err(&step))?;
            self.settle(&step).await?;
        }

        let artifact = self.screenshot(&step, ArtifactKind::Preview, &name).await?;
        info!(
            "Captured {} preview with {} theme: {}",
            preview.name,
            theme,
            artifact.path.display()
        );
        Ok(())
    }

    /// Best effort: a failure here is logged, never reported
    async fn capture_error(&mut self) -> Option<PathBuf> {
        let png = match self.driver.screenshot(self.config.full_page).await {
            Ok(png) => png,
            Err(e) => {
                warn!("Could not take error screenshot: {}", e);
                return None;
            }
        };

        match self.writer.write(ArtifactKind::Error, ERROR_ARTIFACT, &png) {
            Ok(artifact) => {
                info!("Error screenshot saved to {}", artifact.path.display());
                let path = artifact.path.clone();
                self.artifacts.push(artifact);
                Some(path)
            }
            Err(e) => {
                warn!("Could not write error screenshot: {}", e);
                None
            }
        }
    }

    async fn teardown(&mut self) {
        match self.driver.close().await {
            Ok(()) => debug!("Browser session closed"),
            Err(e) => warn!("Failed to close browser session cleanly: {}", e),
        }
    }

    // Step primitives

    async fn goto(&mut self, step: &Step, route: &str) -> Result<()> {
        let url = self
            .config
            .url_for(route)
            .map_err(|e| VerifyError::UnexpectedState {
                step: step.clone(),
                detail: e.to_string(),
            })?;

        match self.driver.goto(&url).await {
            Ok(()) => Ok(()),
            Err(DriverError::Timeout(_)) => Err(VerifyError::NavigationTimeout {
                step: step.clone(),
                target: url,
                timeout: self.config.timeouts.navigation(),
            }),
            Err(e) => Err(VerifyError::driver(step.clone(), e)),
        }
    }

    async fn wait_network_idle(&mut self, step: &Step) -> Result<()> {
        let timeout = self.config.timeouts.navigation();
        let mut poller = self.config.wait(timeout).start();
        loop {
            if self.driver.network_idle().await.map_err(driver_err(step))? {
                return Ok(());
            }
            if !poller.tick().await {
                return Err(VerifyError::NavigationTimeout {
                    step: step.clone(),
                    target: "network idle".to_string(),
                    timeout,
                });
            }
        }
    }

    /// Bounded wait for rendering to settle. Running out of time only warns:
    /// looping decorative animations never settle.
    async fn settle(&mut self, step: &Step) -> Result<()> {
        let timeout = self.config.timeouts.settle();
        let mut poller = self.config.wait(timeout).start();
        loop {
            if self.driver.rendering_settled().await.map_err(driver_err(step))? {
                return Ok(());
            }
            if !poller.tick().await {
                warn!(
                    "[{}] rendering not settled after {}ms, capturing anyway",
                    step,
                    timeout.as_millis()
                );
                return Ok(());
            }
        }
    }

    async fn wait_for_field(&mut self, step: &Step, label: &str, timeout: Duration) -> Result<bool> {
        let mut poller = self.config.wait(timeout).start();
        loop {
            if self.driver.field_present(label).await.map_err(driver_err(step))? {
                return Ok(true);
            }
            if !poller.tick().await {
                return Ok(false);
            }
        }
    }

    async fn wait_for_heading(&mut self, step: &Step, text: &str, timeout: Duration) -> Result<bool> {
        let mut poller = self.config.wait(timeout).start();
        loop {
            if self.driver.heading_visible(text).await.map_err(driver_err(step))? {
                return Ok(true);
            }
            if !poller.tick().await {
                return Ok(false);
            }
        }
    }

    async fn fill(&mut self, step: &Step, label: &str, value: &str) -> Result<()> {
        let timeout = self.config.timeouts.field();
        if !self.wait_for_field(step, label, timeout).await? {
            return Err(VerifyError::NavigationTimeout {
                step: step.clone(),
                target: format!("field '{}'", label),
                timeout,
            });
        }

        if !self
            .driver
            .fill_field(label, value)
            .await
            .map_err(driver_err(step))?
        {
            return Err(VerifyError::UnexpectedState {
                step: step.clone(),
                detail: format!("field '{}' disappeared before it could be filled", label),
            });
        }
        Ok(())
    }

    async fn click(&mut self, step: &Step, name: &str) -> Result<()> {
        let timeout = self.config.timeouts.field();
        let mut poller = self.config.wait(timeout).start();
        loop {
            if self.driver.click_button(name).await.map_err(driver_err(step))? {
                return Ok(());
            }
            if !poller.tick().await {
                return Err(VerifyError::NavigationTimeout {
                    step: step.clone(),
                    target: format!("button '{}'", name),
                    timeout,
                });
            }
        }
    }

    async fn select(&mut self, step: &Step, label: &str, option: &str) -> Result<()> {
        let timeout = self.config.timeouts.field();
        let mut poller = self.config.wait(timeout).start();
        loop {
            if self
                .driver
                .select_option(label, option)
                .await
                .map_err(driver_err(step))?
            {
                return Ok(());
            }
            if !poller.tick().await {
                return Err(VerifyError::NavigationTimeout {
                    step: step.clone(),
                    target: format!("option '{}' in '{}'", option, label),
                    timeout,
                });
            }
        }
    }

    async fn expect_heading(&mut self, step: &Step, text: &str, timeout: Duration) -> Result<()> {
        if self.wait_for_heading(step, text, timeout).await? {
            Ok(())
        } else {
            Err(VerifyError::AssertionFailed {
                step: step.clone(),
                expected: format!("heading '{}'", text),
                timeout,
            })
        }
    }

    async fn expect_text(&mut self, step: &Step, text: &str, timeout: Duration) -> Result<()> {
        let mut poller = self.config.wait(timeout).start();
        loop {
            if self.driver.text_visible(text).await.map_err(driver_err(step))? {
                return Ok(());
            }
            if !poller.tick().await {
                return Err(VerifyError::AssertionFailed {
                    step: step.clone(),
                    expected: format!("text '{}'", text),
                    timeout,
                });
            }
        }
    }

    async fn screenshot(&mut self, step: &Step, kind: ArtifactKind, name: &str) -> Result<Artifact> {
        let png = self
            .driver
            .screenshot(self.config.full_page)
            .await
            .map_err(driver_err(step))?;

        let artifact = self
            .writer
            .write(kind, name, &png)
            .map_err(|e| VerifyError::UnexpectedState {
                step: step.clone(),
                detail: format!("could not write {}: {}", name, e),
            })?;
        self.artifacts.push(artifact.clone());
        Ok(artifact)
    }
}

fn driver_err(step: &Step) -> impl FnOnce(DriverError) -> VerifyError + '_ {
    move |e| VerifyError::driver(step.clone(), e)
}
