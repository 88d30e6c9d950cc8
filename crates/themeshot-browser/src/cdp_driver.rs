use crate::dom;
use crate::error::driver_error;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use themeshot_core::{Driver, DriverError, DriverResult};
use tokio::task::JoinHandle;

#[derive(Debug, Deserialize)]
struct NetworkSnapshot {
    ready: bool,
    resources: u64,
}

/// Network is idle once the document is complete and no resource entry
/// was added since the previous probe.
#[derive(Debug, Default)]
struct IdleTracker {
    last_resources: Option<u64>,
}

impl IdleTracker {
    fn observe(&mut self, snapshot: &NetworkSnapshot) -> bool {
        let previous = self.last_resources.replace(snapshot.resources);
        snapshot.ready && previous == Some(snapshot.resources)
    }

    fn reset(&mut self) {
        self.last_resources = None;
    }
}

/// Chrome session driven over the DevTools protocol
pub struct CdpDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    idle: IdleTracker,
    closed: bool,
}

impl CdpDriver {
    pub(crate) fn new(browser: Browser, page: Page, handler_task: JoinHandle<()>) -> Self {
        Self {
            browser,
            page,
            handler_task,
            idle: IdleTracker::default(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            Err(DriverError::Closed)
        } else {
            Ok(())
        }
    }

    async fn eval<T: DeserializeOwned + Send>(&self, script: &str) -> DriverResult<T> {
        self.ensure_open()?;
        self.page
            .evaluate(script)
            .await
            .map_err(driver_error)?
            .into_value::<T>()
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    /// Resolve the element a `mark_*` script tagged, then drop the tag
    async fn take_marked(&self) -> DriverResult<chromiumoxide::Element> {
        let element = self
            .page
            .find_element(dom::TARGET_SELECTOR)
            .await
            .map_err(driver_error)?;
        let _: bool = self.eval(&dom::clear_marks()).await?;
        Ok(element)
    }
}

#[async_trait]
impl Driver for CdpDriver {
    async fn goto(&mut self, url: &str) -> DriverResult<()> {
        self.ensure_open()?;
        tracing::debug!("Navigating to {}", url);
        self.idle.reset();
        self.page.goto(url).await.map_err(driver_error)?;
        Ok(())
    }

    async fn current_url(&mut self) -> DriverResult<Option<String>> {
        self.ensure_open()?;
        self.page.url().await.map_err(driver_error)
    }

    async fn network_idle(&mut self) -> DriverResult<bool> {
        let snapshot: NetworkSnapshot = self.eval(&dom::network_snapshot()).await?;
        Ok(self.idle.observe(&snapshot))
    }

    async fn field_present(&mut self, label: &str) -> DriverResult<bool> {
        self.eval(&dom::field_present(label)).await
    }

    async fn fill_field(&mut self, label: &str, value: &str) -> DriverResult<bool> {
        let marked: bool = self.eval(&dom::mark_field(label)).await?;
        if !marked {
            return Ok(false);
        }

        let element = self.take_marked().await?;
        element.click().await.map_err(driver_error)?;
        element.type_str(value).await.map_err(driver_error)?;
        tracing::debug!("Filled field '{}'", label);
        Ok(true)
    }

    async fn click_button(&mut self, name: &str) -> DriverResult<bool> {
        let marked: bool = self.eval(&dom::mark_button(name)).await?;
        if !marked {
            return Ok(false);
        }

        let element = self.take_marked().await?;
        element.click().await.map_err(driver_error)?;
        tracing::debug!("Clicked button '{}'", name);
        Ok(true)
    }

    async fn select_option(&mut self, label: &str, option: &str) -> DriverResult<bool> {
        self.eval(&dom::select_option(label, option)).await
    }

    async fn heading_visible(&mut self, text: &str) -> DriverResult<bool> {
        self.eval(&dom::heading_visible(text)).await
    }

    async fn text_visible(&mut self, text: &str) -> DriverResult<bool> {
        self.eval(&dom::text_visible(text)).await
    }

    async fn rendering_settled(&mut self) -> DriverResult<bool> {
        self.eval(&dom::rendering_settled()).await
    }

    async fn scroll_to(&mut self, y: u32) -> DriverResult<()> {
        let _: bool = self.eval(&dom::scroll_to(y)).await?;
        Ok(())
    }

    async fn screenshot(&mut self, full_page: bool) -> DriverResult<Vec<u8>> {
        self.ensure_open()?;
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(full_page)
                    .build(),
            )
            .await
            .map_err(driver_error)
    }

    async fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        tracing::info!("Closing browser");
        let result = self.browser.close().await.map_err(driver_error);
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for Chrome to exit failed: {}", e);
        }
        self.handler_task.abort();
        result.map(|_| ())
    }
}

impl Drop for CdpDriver {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("Browser session dropped without close; Chrome is killed on drop");
            self.handler_task.abort();
        }
    }
}
