use anyhow::Result;
use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::sync::Mutex;
use tracing::info;

use jobfill::bridge::{self, FillHandler};
use jobfill::{AnswerRequester, BrowserDocument, FillError, FillerConfig, Orchestrator, ProfileStore};

use crate::commands::utils;

/// Fills the page open in one browser session. The profile is re-read for
/// every request so keys saved meanwhile take effect.
struct BrowserFillHandler {
    page: Mutex<BrowserDocument>,
    config: FillerConfig,
    requester: AnswerRequester,
    store: ProfileStore,
}

#[async_trait]
impl FillHandler for BrowserFillHandler {
    async fn fill_form(&self, url: Option<&str>) -> Result<(), FillError> {
        let page = self.page.lock().await;
        if let Some(url) = url {
            let url = utils::validate_url(url)?;
            page.goto(url.as_str()).await?;
        }
        let profile = self.store.load()?;
        let report = Orchestrator::new(&*page, &self.requester, &self.config)
            .run(&profile)
            .await?;
        info!(
            "Filled {} of {} fields",
            report.fields_written, report.fields_found
        );
        Ok(())
    }
}

pub async fn handle_bridge(
    url: String,
    browser: String,
    no_headless: bool,
    viewport: Option<String>,
) -> Result<()> {
    let config = FillerConfig::load()?;
    let requester = AnswerRequester::new(&config)?;
    let store = ProfileStore::new()?;

    let url = utils::validate_url(&url)?;
    let page = utils::open_browser(&browser, viewport, no_headless).await?;
    page.goto(url.as_str()).await?;
    let handler = BrowserFillHandler {
        page: Mutex::new(page),
        config,
        requester,
        store,
    };

    info!("Bridge ready, send {{\"action\":\"fillForm\"}} lines on stdin");
    let served = bridge::serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), &handler).await;

    handler.page.into_inner().close().await?;
    served
}
