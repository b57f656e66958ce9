//! Chrome over the DevTools protocol, behind a blocking facade.
//!
//! `chromiumoxide` is async; every session owns a small tokio runtime and
//! blocks on it, so callers stay synchronous.

use anyhow::{Context, Result, anyhow, bail};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use xraygen_ports::{BrowserLauncher, BrowserPage, POLL_INTERVAL};

/// Launches one Chrome process per session.
#[derive(Clone, Debug)]
pub struct ChromeLauncher {
    pub headless: bool,
    /// Upper bound for navigation settling and CDP requests.
    pub element_timeout: Duration,
    pub executable: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(headless: bool, element_timeout: Duration) -> Self {
        Self {
            headless,
            element_timeout,
            executable: None,
        }
    }

    pub fn from_config(config: &xraygen_config::BrowserConfig) -> Self {
        Self::new(
            config.headless,
            Duration::from_secs(config.element_timeout_secs),
        )
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.element_timeout.max(Duration::from_secs(30)));
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|e| anyhow!("invalid browser configuration: {e}"))
    }
}

impl BrowserLauncher for ChromeLauncher {
    fn launch(&self) -> Result<Box<dyn BrowserPage>> {
        Ok(Box::new(ChromeSession::launch(self)?))
    }
}

/// One Chrome process with a single open tab.
pub struct ChromeSession {
    runtime: Runtime,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    settle_timeout: Duration,
}

impl ChromeSession {
    pub fn launch(launcher: &ChromeLauncher) -> Result<Self> {
        let config = launcher.browser_config()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("failed to start browser runtime")?;

        let (browser, mut events) = runtime
            .block_on(Browser::launch(config))
            .context("failed to launch Chrome")?;
        let handler = runtime.spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser event loop stopped");
                    break;
                }
            }
        });
        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .context("failed to open a browser tab")?;

        tracing::debug!(headless = launcher.headless, "browser session started");
        Ok(Self {
            runtime,
            browser,
            page,
            handler,
            settle_timeout: launcher.element_timeout,
        })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn eval_bool(&self, script: String) -> Result<bool> {
        self.block_on(async {
            let result = self.page.evaluate(script).await?;
            result
                .into_value::<bool>()
                .map_err(|e| anyhow!("unexpected script result: {e}"))
        })
    }
}

impl BrowserPage for ChromeSession {
    fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "navigate");
        self.block_on(self.page.goto(url))
            .with_context(|| format!("navigation to {url} failed"))?;
        Ok(())
    }

    fn wait_for_idle(&self) -> Result<()> {
        let settle = self.settle_timeout;
        self.block_on(async {
            // A timeout here only means no navigation was pending.
            let _ = tokio::time::timeout(settle, self.page.wait_for_navigation()).await;
            let settled = async {
                loop {
                    let ready = self
                        .page
                        .evaluate("document.readyState === 'complete'")
                        .await
                        .ok()
                        .and_then(|r| r.into_value::<bool>().ok())
                        .unwrap_or(false);
                    if ready {
                        break;
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            };
            let _ = tokio::time::timeout(settle, settled).await;
        });
        Ok(())
    }

    fn is_visible(&self, selector: &str) -> Result<bool> {
        self.eval_bool(scripts::is_visible(selector))
    }

    fn fill(&self, selector: &str, text: &str) -> Result<()> {
        if !self.eval_bool(scripts::clear_and_focus(selector))? {
            bail!("no element matches {selector}");
        }
        self.block_on(async {
            let element = self.page.find_element(selector).await?;
            element.type_str(text).await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .with_context(|| format!("failed to type into {selector}"))
    }

    fn click(&self, selector: &str) -> Result<()> {
        self.block_on(async {
            let element = self.page.find_element(selector).await?;
            element.click().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .with_context(|| format!("failed to click {selector}"))
    }

    fn press(&self, selector: &str, key: &str) -> Result<()> {
        self.block_on(async {
            let element = self.page.find_element(selector).await?;
            element.press_key(key).await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .with_context(|| format!("failed to press {key} in {selector}"))
    }

    fn set_checked(&self, selector: &str, checked: bool) -> Result<()> {
        if !self.eval_bool(scripts::set_checked(selector, checked))? {
            bail!("no checkbox matches {selector}");
        }
        Ok(())
    }

    fn select_option(&self, selector: &str, label: &str) -> Result<()> {
        if !self.eval_bool(scripts::select_by_label(selector, label))? {
            bail!("{selector} has no option labelled {label:?}");
        }
        Ok(())
    }

    fn click_text(&self, selector: &str, text: &str) -> Result<bool> {
        self.eval_bool(scripts::click_text(selector, text))
    }

    fn inner_text(&self, selector: &str) -> Result<String> {
        let text = self
            .block_on(async {
                let element = self.page.find_element(selector).await?;
                element.inner_text().await
            })
            .with_context(|| format!("failed to read {selector}"))?;
        Ok(text.unwrap_or_default())
    }

    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn close(self: Box<Self>) -> Result<()> {
        let ChromeSession {
            runtime,
            mut browser,
            page,
            handler,
            ..
        } = *self;
        let closed = runtime.block_on(async move {
            if let Err(e) = page.close().await {
                tracing::debug!(error = %e, "tab close failed");
            }
            browser.close().await?;
            browser.wait().await?;
            Ok::<_, anyhow::Error>(())
        });
        handler.abort();
        tracing::debug!("browser session closed");
        closed.context("failed to shut down Chrome")
    }
}

/// In-page scripts. Arguments are embedded as JSON string literals.
mod scripts {
    fn literal(s: &str) -> String {
        serde_json::Value::String(s.to_string()).to_string()
    }

    pub fn is_visible(selector: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             const style = window.getComputedStyle(el); \
             return style.display !== 'none' && style.visibility !== 'hidden' && el.getClientRects().length > 0; }})()",
            sel = literal(selector)
        )
    }

    pub fn clear_and_focus(selector: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             el.focus(); \
             if ('value' in el) {{ el.value = ''; el.dispatchEvent(new Event('input', {{ bubbles: true }})); }} \
             return true; }})()",
            sel = literal(selector)
        )
    }

    pub fn set_checked(selector: &str, checked: bool) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             if (el.checked !== {checked}) el.click(); \
             return true; }})()",
            sel = literal(selector)
        )
    }

    pub fn select_by_label(selector: &str, label: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             const opt = Array.from(el.options || []).find(o => o.text.trim() === {label}); \
             if (!opt) return false; \
             el.value = opt.value; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            sel = literal(selector),
            label = literal(label)
        )
    }

    pub fn click_text(selector: &str, text: &str) -> String {
        format!(
            "(() => {{ const hit = Array.from(document.querySelectorAll({sel})) \
             .find(el => el.getClientRects().length > 0 && (el.textContent || '').includes({text})); \
             if (!hit) return false; \
             hit.click(); \
             return true; }})()",
            sel = literal(selector),
            text = literal(text)
        )
    }

}
