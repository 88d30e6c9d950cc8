use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("browser protocol error: {0}")]
    Protocol(String),

    #[error("browser did not answer in time: {0}")]
    Timeout(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("browser session already closed")]
    Closed,
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Browser operations the runner depends on.
///
/// Probes answer `Ok(false)` when the element or condition is not there
/// yet. `Err` is reserved for a broken session.
#[async_trait]
pub trait Driver: Send {
    /// Navigate and wait for the load event
    async fn goto(&mut self, url: &str) -> DriverResult<()>;

    async fn current_url(&mut self) -> DriverResult<Option<String>>;

    /// One probe of network quiescence
    async fn network_idle(&mut self) -> DriverResult<bool>;

    async fn field_present(&mut self, label: &str) -> DriverResult<bool>;

    /// Replace the value of the form control labelled `label`
    async fn fill_field(&mut self, label: &str, value: &str) -> DriverResult<bool>;

    async fn click_button(&mut self, name: &str) -> DriverResult<bool>;

    /// Choose `option` (by value or visible text) in the select labelled `label`
    async fn select_option(&mut self, label: &str, option: &str) -> DriverResult<bool>;

    async fn heading_visible(&mut self, text: &str) -> DriverResult<bool>;

    async fn text_visible(&mut self, text: &str) -> DriverResult<bool>;

    /// Fonts loaded and no finite animation still running
    async fn rendering_settled(&mut self) -> DriverResult<bool>;

    async fn scroll_to(&mut self, y: u32) -> DriverResult<()>;

    /// PNG bytes of the viewport, or of the whole document when `full_page`
    async fn screenshot(&mut self, full_page: bool) -> DriverResult<Vec<u8>>;

    async fn close(&mut self) -> DriverResult<()>;
}
