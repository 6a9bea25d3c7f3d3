//! Locates or launches the WebDriver server a fill run talks to.

use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::browser::BrowserType;

/// Polls of `/status` while a freshly spawned driver starts (100 ms apart)
const STARTUP_POLLS: u32 = 30;

/// Owns the geckodriver/chromedriver processes this run started
#[derive(Default)]
pub struct DriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    url: String,
}

impl BrowserType {
    /// Name of the driver binary
    pub fn driver_command(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }

    /// Ports tried before asking the OS for one
    fn preferred_ports(&self) -> [u16; 3] {
        match self {
            BrowserType::Firefox => [4444, 4445, 4446],
            BrowserType::Chrome => [9515, 9516, 9517],
        }
    }

    fn port_arg(&self, port: u16) -> Vec<String> {
        match self {
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
            BrowserType::Chrome => vec![format!("--port={}", port)],
        }
    }
}

impl DriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn processes(&self) -> MutexGuard<'_, Vec<DriverProcess>> {
        self.processes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// URL of a ready driver for `browser_type`, starting one if needed
    pub async fn ensure_driver(&self, browser_type: BrowserType) -> Result<String> {
        let managed: Vec<String> = self
            .processes()
            .iter()
            .filter(|p| p.browser_type == browser_type)
            .map(|p| p.url.clone())
            .collect();
        for url in managed {
            if is_driver_ready(&url).await {
                debug!("Using managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        let default_url = format!("http://localhost:{}", browser_type.preferred_ports()[0]);
        if is_driver_ready(&default_url).await {
            debug!("Found external WebDriver at {}", default_url);
            return Ok(default_url);
        }

        info!("WebDriver not detected, starting {}", browser_type.driver_command());
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: BrowserType) -> Result<String> {
        let command = browser_type.driver_command();
        let port = free_port(browser_type)?;

        let mut cmd = Command::new(command);
        cmd.args(browser_type.port_arg(port))
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let child = cmd.spawn().with_context(|| {
            format!(
                "Failed to start {}. Install it and make sure it is on PATH \
                 (see https://www.selenium.dev/documentation/webdriver/getting_started/install_drivers/)",
                command
            )
        })?;

        let url = format!("http://localhost:{}", port);
        info!("Started {} (pid {}) on port {}", command, child.id(), port);
        self.processes().push(DriverProcess {
            browser_type,
            child,
            url: url.clone(),
        });

        for _ in 0..STARTUP_POLLS {
            if is_driver_running(&url).await {
                return Ok(url);
            }
            sleep(Duration::from_millis(100)).await;
        }

        self.stop_matching(|p| p.url == url);
        anyhow::bail!("WebDriver {} failed to start within timeout", command)
    }

    /// Stop every driver this manager started
    pub fn stop_all(&self) {
        self.stop_matching(|_| true);
    }

    fn stop_matching(&self, pred: impl Fn(&DriverProcess) -> bool) {
        let mut processes = self.processes();
        let (stop, keep): (Vec<_>, Vec<_>) = processes.drain(..).partition(|p| pred(p));
        *processes = keep;
        drop(processes);

        for mut process in stop {
            debug!("Stopping WebDriver at {}", process.url);
            #[cfg(unix)]
            kill_process_group(process.child.id());
            let _ = process.child.kill();
            let _ = process.child.wait();
        }
    }
}

impl Drop for DriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Terminate the driver together with the browser it spawned
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(pid as i32);
    if let Err(e) = killpg(pgid, Signal::SIGTERM) {
        debug!("SIGTERM to process group {} failed: {}", pgid, e);
        return;
    }
    std::thread::sleep(Duration::from_millis(100));
    let _ = killpg(pgid, Signal::SIGKILL);
}

fn free_port(browser_type: BrowserType) -> Result<u16> {
    for port in browser_type.preferred_ports() {
        if std::net::TcpListener::bind(("127.0.0.1", port)).is_ok() {
            return Ok(port);
        }
        debug!("Port {} is in use", port);
    }
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// `/status` answers with a success code
pub async fn is_driver_running(url: &str) -> bool {
    status(url).await.is_some()
}

/// `/status` reports `value.ready == true`
pub async fn is_driver_ready(url: &str) -> bool {
    status(url)
        .await
        .and_then(|body| body.pointer("/value/ready").and_then(|r| r.as_bool()))
        .unwrap_or(false)
}

async fn status(url: &str) -> Option<serde_json::Value> {
    let response = reqwest::Client::new()
        .get(format!("{}/status", url))
        .timeout(Duration::from_secs(1))
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        return None;
    }
    Some(response.json().await.unwrap_or(serde_json::Value::Null))
}

lazy_static::lazy_static! {
    pub static ref GLOBAL_DRIVER_MANAGER: DriverManager = DriverManager::new();
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;
