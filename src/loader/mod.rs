//! Host-environment loader capabilities.
//!
//! The service consumes two capabilities through trait seams: a plain HTTP
//! page fetcher and a hidden-frame loader for cross-origin dashboard
//! content. [`HttpPageFetcher`] is provided; frame hosting is inherently a
//! host-environment concern (a webview, a wasm DOM shim), so only the trait
//! is shipped and [`DisabledFrameHost`] stands in where no host is wired.

mod http;

pub use http::HttpPageFetcher;

use async_trait::async_trait;

use crate::{MuninnError, Result};

/// Plain HTTP fetch capability for HTML resources.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the response body.
    ///
    /// Non-success statuses are errors; the caller decides how to degrade.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// First signal observed from a hidden frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSignal {
    /// The frame's load event fired.
    Loaded,
    /// The frame's error event fired.
    Failed(String),
}

/// Sandbox capability grants for a hidden frame.
///
/// Only scripts, same-origin and forms can be granted; top-navigation and
/// popups are never available, so a warmed frame cannot affect the host
/// page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxPolicy {
    pub allow_scripts: bool,
    pub allow_same_origin: bool,
    pub allow_forms: bool,
}

impl Default for SandboxPolicy {
    /// The full grantable set — what dashboard content needs to render.
    fn default() -> Self {
        Self {
            allow_scripts: true,
            allow_same_origin: true,
            allow_forms: true,
        }
    }
}

impl SandboxPolicy {
    /// The policy as a space-separated sandbox attribute value.
    pub fn attribute_value(&self) -> String {
        let mut tokens = Vec::new();
        if self.allow_scripts {
            tokens.push("allow-scripts");
        }
        if self.allow_same_origin {
            tokens.push("allow-same-origin");
        }
        if self.allow_forms {
            tokens.push("allow-forms");
        }
        tokens.join(" ")
    }
}

/// A hidden frame attached to the host document.
///
/// Implementations must deliver at most one signal from
/// [`wait()`](Self::wait) and must stop delivering signals entirely once
/// [`detach()`](Self::detach) has run — late events on a detached frame are
/// dropped, never surfaced.
#[async_trait]
pub trait FrameHandle: Send {
    /// Wait for the frame's first load or error signal.
    async fn wait(&mut self) -> FrameSignal;

    /// Remove event handlers, then remove the frame from the document.
    fn detach(&mut self);
}

/// Hidden-frame loader capability.
#[async_trait]
pub trait FrameHost: Send + Sync {
    /// Create an invisible, zero-size frame for `url` under `sandbox` and
    /// attach it to the host document.
    async fn open(&self, url: &str, sandbox: &SandboxPolicy) -> Result<Box<dyn FrameHandle>>;

    /// Emit preconnect / DNS-prefetch hints for `origin`.
    ///
    /// Best-effort; the default implementation does nothing.
    fn hint_origin(&self, _origin: &str) {}
}

/// Frame host used when none is configured.
///
/// Refuses every open, which the orchestrator settles as a frame failure —
/// iframe descriptors degrade instead of erroring the batch.
#[derive(Debug, Default)]
pub struct DisabledFrameHost;

#[async_trait]
impl FrameHost for DisabledFrameHost {
    async fn open(&self, _url: &str, _sandbox: &SandboxPolicy) -> Result<Box<dyn FrameHandle>> {
        Err(MuninnError::Frame("no frame host configured".to_string()))
    }
}

/// The ASCII origin (`scheme://host[:port]`) of `url`.
pub(crate) fn origin_of(url: &str) -> Result<String> {
    let parsed: reqwest::Url = url
        .parse()
        .map_err(|_| MuninnError::InvalidUrl(url.to_string()))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(MuninnError::InvalidUrl(url.to_string()));
    }
    Ok(origin.ascii_serialization())
}
