//! Line-delimited JSON message loop.
//!
//! Each input line is a request such as `{"action":"fillForm"}`; each gets
//! exactly one response line, `{"success":true}` or
//! `{"success":false,"error":"..."}`.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::errors::FillError;

pub const FILL_FORM: &str = "fillForm";

/// Incoming message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub action: String,
    /// Page to open before filling; the current page when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Reply to one [`BridgeRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    pub fn ok() -> Self {
        BridgeResponse {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        BridgeResponse {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Performs one fill when a `fillForm` message arrives
#[async_trait]
pub trait FillHandler: Send + Sync {
    async fn fill_form(&self, url: Option<&str>) -> Result<(), FillError>;
}

/// Answer one raw message line
pub async fn handle_line<H: FillHandler + ?Sized>(handler: &H, line: &str) -> BridgeResponse {
    let request: BridgeRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed message: {}", e);
            return BridgeResponse::failed(format!("Malformed message: {}", e));
        }
    };
    info!("Received request: {:?}", request);

    if request.action != FILL_FORM {
        return BridgeResponse::failed(format!("Unknown action: {}", request.action));
    }
    match handler.fill_form(request.url.as_deref()).await {
        Ok(()) => BridgeResponse::ok(),
        Err(e) => BridgeResponse::failed(e.to_string()),
    }
}

/// Serve requests from `reader` until it is exhausted. Blank lines are ignored.
pub async fn serve<R, W, H>(reader: R, mut writer: W, handler: &H) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    H: FillHandler + ?Sized,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(handler, line.trim()).await;
        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }
    debug!("Input closed, bridge stopping");
    Ok(())
}

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;
