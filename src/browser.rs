//! Live page behind WebDriver.
//!
//! Every element captured by [`DocumentPort::snapshot`] is tagged with a
//! `data-jobfill-node` attribute holding its [`NodeId`], so later writes can
//! find it again.

use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, info};

use crate::dom::{DomSnapshot, NodeId};
use crate::driver::GLOBAL_DRIVER_MANAGER;
use crate::port::{DocumentPort, DomEvent, NoticeLevel};
use crate::profile::ResumeFile;
use crate::types::{JobContext, ViewportSize};

/// Attribute linking live elements to snapshot ids
pub const NODE_ATTR: &str = "data-jobfill-node";

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    Firefox,
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Case-insensitive; `chromium` is accepted as Chrome
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

/// Walks the document in order, tags each element and returns the node list.
const SNAPSHOT_SCRIPT: &str = r#"
const SKIP = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']);
const nodes = [];
function isVisible(el) {
    if (el.hidden) return false;
    if (el.tagName === 'INPUT' && (el.type || '').toLowerCase() === 'hidden') return false;
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    return el.tagName === 'BODY' || el.tagName === 'HTML' || el.getClientRects().length > 0;
}
function walk(el, parent) {
    const id = nodes.length;
    el.setAttribute('data-jobfill-node', String(id));
    const attrs = {};
    for (const a of el.attributes) attrs[a.name] = a.value;
    if (el.checked) attrs['checked'] = '';
    if (el.tagName === 'OPTION' && el.selected) attrs['selected'] = '';
    const node = {
        tag: el.tagName.toLowerCase(),
        attrs: attrs,
        children: [],
        parent: parent,
        visible: (parent === null || nodes[parent].visible) && isVisible(el),
        disabled: !!el.disabled,
        readOnly: !!el.readOnly,
        value: typeof el.value === 'string' ? el.value : '',
        styleWidth: el.style ? el.style.width : ''
    };
    nodes.push(node);
    for (const child of el.childNodes) {
        if (child.nodeType === Node.TEXT_NODE) {
            node.children.push(child.textContent);
        } else if (child.nodeType === Node.ELEMENT_NODE && !SKIP.has(child.tagName)) {
            node.children.push(walk(child, id));
        }
    }
    return id;
}
walk(document.documentElement, null);
return JSON.stringify(nodes);
"#;

const FIND_ELEMENT: &str = r#"
const el = document.querySelector('[data-jobfill-node="' + arguments[0] + '"]');
if (!el) throw new Error('element ' + arguments[0] + ' is gone');
"#;

/// A WebDriver session acting as the document port
pub struct BrowserDocument {
    client: Client,
}

impl BrowserDocument {
    /// Start a browser session, launching the driver when needed
    pub async fn connect(
        browser_type: BrowserType,
        viewport: Option<ViewportSize>,
        headless: bool,
    ) -> Result<Self> {
        info!("Connecting to {:?} WebDriver", browser_type);
        let webdriver_url = GLOBAL_DRIVER_MANAGER.ensure_driver(browser_type).await?;

        let mut caps = serde_json::Map::new();
        match browser_type {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if headless {
                    args.push("--headless".to_string());
                }
                if let Some(vp) = &viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let profile_dir = tempfile::Builder::new().prefix("jobfill-chrome-").tempdir()?;
                let mut args = vec!["--no-sandbox".to_string()];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                if let Some(vp) = &viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }
                #[allow(deprecated)]
                let profile_dir = profile_dir.into_path();
                args.push(format!("--user-data-dir={}", profile_dir.display()));
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&webdriver_url)
            .await
            .context("Failed to connect to WebDriver")?;

        if let Some(vp) = viewport
            && let Err(e) = client.set_window_size(vp.width, vp.height).await
        {
            debug!("Could not set window size: {}", e);
        }

        Ok(BrowserDocument { client })
    }

    /// Navigate and wait (up to two seconds) for `document.readyState` to be complete
    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;

        for _ in 0..20 {
            match self
                .client
                .execute("return document.readyState === 'complete';", vec![])
                .await
            {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(std::time::Duration::from_millis(100)).await,
            }
        }
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await.context("Failed to close browser session")
    }

    async fn run(&self, script: &str, args: Vec<serde_json::Value>) -> Result<serde_json::Value> {
        self.client
            .execute(script, args)
            .await
            .context("Failed to execute script")
    }

    /// Run `body` with `el` bound to the element tagged `node`
    async fn on_element(
        &self,
        node: NodeId,
        body: &str,
        mut args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        args.insert(0, json!(node.0));
        self.run(&format!("{}{}", FIND_ELEMENT, body), args).await
    }

    fn selector(node: NodeId) -> String {
        format!("[{}=\"{}\"]", NODE_ATTR, node.0)
    }
}

#[async_trait]
impl DocumentPort for BrowserDocument {
    async fn snapshot(&self) -> Result<DomSnapshot> {
        let raw = self.run(SNAPSHOT_SCRIPT, vec![]).await?;
        let json = raw.as_str().context("Snapshot script returned no JSON")?;
        let nodes = serde_json::from_str(json).context("Malformed page snapshot")?;
        Ok(DomSnapshot::new(nodes))
    }

    async fn job_context(&self, limit: usize) -> Result<JobContext> {
        let raw = self
            .run(
                "return { text: (document.body ? document.body.innerText : '').substring(0, arguments[0]), \
                 title: document.title, url: window.location.href };",
                vec![json!(limit)],
            )
            .await?;
        let field = |name: &str| raw.get(name).and_then(|v| v.as_str()).unwrap_or_default().to_string();
        Ok(JobContext::new(&field("text"), &field("title"), &field("url"), limit))
    }

    async fn set_value(&self, node: NodeId, value: &str) -> Result<()> {
        self.on_element(
            node,
            r#"
const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
const setter = Object.getOwnPropertyDescriptor(proto, 'value');
if (setter && setter.set) { setter.set.call(el, arguments[1]); } else { el.value = arguments[1]; }
"#,
            vec![json!(value)],
        )
        .await?;
        Ok(())
    }

    async fn select_option(&self, select: NodeId, option: NodeId) -> Result<()> {
        self.on_element(
            select,
            r#"
const opt = document.querySelector('[data-jobfill-node="' + arguments[1] + '"]');
if (!opt) throw new Error('option ' + arguments[1] + ' is gone');
el.value = opt.value;
opt.selected = true;
"#,
            vec![json!(option.0)],
        )
        .await?;
        Ok(())
    }

    async fn check(&self, radio: NodeId) -> Result<()> {
        self.on_element(radio, "el.checked = true; el.click();", vec![]).await?;
        Ok(())
    }

    async fn attach_file(&self, input: NodeId, file: &ResumeFile) -> Result<()> {
        self.on_element(
            input,
            r#"
const bin = atob(arguments[1]);
const bytes = new Uint8Array(bin.length);
for (let i = 0; i < bin.length; i++) bytes[i] = bin.charCodeAt(i);
const dt = new DataTransfer();
dt.items.add(new File([bytes], arguments[2], { type: arguments[3] }));
el.files = dt.files;
"#,
            vec![json!(file.to_base64()), json!(file.name), json!(file.mime_type)],
        )
        .await?;
        Ok(())
    }

    async fn dispatch(&self, node: NodeId, events: &[DomEvent]) -> Result<()> {
        let names: Vec<&str> = events.iter().map(DomEvent::as_str).collect();
        self.on_element(
            node,
            "for (const name of arguments[1]) el.dispatchEvent(new Event(name, { bubbles: true }));",
            vec![json!(names)],
        )
        .await?;
        Ok(())
    }

    async fn highlight(&self, node: NodeId) -> Result<()> {
        self.on_element(
            node,
            r#"
const previous = el.style.backgroundColor;
el.style.backgroundColor = '#e8f5e9';
setTimeout(() => { el.style.backgroundColor = previous; }, 1000);
"#,
            vec![],
        )
        .await?;
        Ok(())
    }

    async fn widget_select(&self, select: NodeId, answer: &str) -> Result<bool> {
        let applied = self
            .on_element(
                select,
                r#"
if (!window.jQuery || !window.jQuery(el).data('select2')) return false;
const wanted = arguments[1].trim().toLowerCase();
const match = Array.from(el.options).find(o => {
    const text = o.text.trim().toLowerCase();
    return text.includes(wanted) || o.value.toLowerCase().includes(wanted) || (text && wanted.includes(text));
});
if (!match) return false;
window.jQuery(el).val(match.value).trigger('change');
return true;
"#,
                vec![json!(answer)],
            )
            .await?;
        Ok(applied.as_bool().unwrap_or(false))
    }

    async fn click(&self, node: NodeId) -> Result<()> {
        let element = self.client.find(Locator::Css(&Self::selector(node))).await?;
        if let Err(e) = element.click().await {
            debug!("Native click on {} failed ({}), clicking from script", node, e);
            self.on_element(node, "el.click();", vec![]).await?;
        }
        Ok(())
    }

    async fn type_text(&self, node: NodeId, text: &str) -> Result<()> {
        let element = self.client.find(Locator::Css(&Self::selector(node))).await?;
        element.clear().await.ok();
        element.send_keys(text).await?;
        self.dispatch(node, &[DomEvent::Input]).await
    }

    async fn pick_first_widget_result(&self) -> Result<bool> {
        let picked = self
            .run(
                r#"
const option = document.querySelector('.select2-results__option[aria-selected="false"]');
if (!option) return false;
option.dispatchEvent(new MouseEvent('mouseup', { bubbles: true }));
option.click();
return true;
"#,
                vec![],
            )
            .await?;
        Ok(picked.as_bool().unwrap_or(false))
    }

    async fn press_enter(&self, node: NodeId) -> Result<()> {
        self.on_element(
            node,
            r#"
for (const type of ['keydown', 'keyup']) {
    el.dispatchEvent(new KeyboardEvent(type, { key: 'Enter', code: 'Enter', keyCode: 13, which: 13, bubbles: true }));
}
"#,
            vec![],
        )
        .await?;
        Ok(())
    }

    async fn notify(&self, message: &str, level: NoticeLevel) -> Result<()> {
        let (background, icon) = match level {
            NoticeLevel::Success => ("linear-gradient(135deg, #10b981 0%, #059669 100%)", "✓"),
            NoticeLevel::Error => ("linear-gradient(135deg, #ef4444 0%, #dc2626 100%)", "✗"),
            NoticeLevel::Info => ("linear-gradient(135deg, #3b82f6 0%, #2563eb 100%)", "⏳"),
        };
        let linger_ms = match level {
            NoticeLevel::Info => 0,
            _ => 4000,
        };
        self.run(
            r#"
if (!document.body) return;
const existing = document.getElementById('ai-form-filler-notification');
if (existing) existing.remove();
const banner = document.createElement('div');
banner.id = 'ai-form-filler-notification';
banner.style.cssText = 'position: fixed !important; top: 20px !important; right: 20px !important;' +
    'background: ' + arguments[1] + ' !important; color: white !important; padding: 16px 24px !important;' +
    'border-radius: 12px !important; z-index: 2147483647 !important; font: 600 14px sans-serif !important;' +
    'max-width: 350px !important; box-shadow: 0 10px 40px rgba(0, 0, 0, 0.3) !important;';
banner.textContent = arguments[2] + ' ' + arguments[0];
document.body.appendChild(banner);
if (arguments[3] > 0) setTimeout(() => banner.remove(), arguments[3]);
"#,
            vec![json!(message), json!(background), json!(icon), json!(linger_ms)],
        )
        .await?;
        Ok(())
    }
}
