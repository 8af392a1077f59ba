//! Chrome DevTools Protocol implementation of [`BrowserSession`].
//!
//! Elements are tracked as CDP remote object ids: lookups evaluate a finder
//! function and keep the returned object alive, actions call functions on it.

use crate::browser::launcher::build_command;
use crate::browser::port::allocate_cdp_port;
use crate::browser::session::{BrowserSession, By, ElementHandle, Key, Locator};
use crate::config::schema::BrowserConfig;
use crate::config::validation::validate_chrome_path;
use crate::error::{Result, VwsError};
use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::process::Child;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const LAUNCH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A single page target of a Chrome instance, driven over CDP.
pub struct CdpSession {
    ws_tx: Arc<Mutex<WsSink>>,
    responses: PendingMap,
    msg_id: AtomicU64,
    reader: JoinHandle<()>,
    /// Chrome process, when this session launched it
    chrome: Option<Child>,
    /// Removed when the session is dropped
    _profile_dir: Option<TempDir>,
}

impl CdpSession {
    /// Launch Chrome with remote debugging enabled and attach to its first page.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        validate_chrome_path(&config.chrome_path)?;

        let profile_dir = tempfile::Builder::new().prefix("vws-web-").tempdir()?;
        let cdp_port = allocate_cdp_port();

        let mut cmd = tokio::process::Command::from(build_command(
            config,
            cdp_port,
            profile_dir.path(),
        ));
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            VwsError::Launch(format!(
                "Failed to launch Chrome at {:?}: {}",
                config.chrome_path, e
            ))
        })?;
        tracing::info!(
            "Launched Chrome pid={:?} cdp_port={}",
            child.id(),
            cdp_port
        );

        let ws_url = discover_page_target(cdp_port, config.launch_retries).await?;
        let mut session = Self::connect(&ws_url).await?;
        session.chrome = Some(child);
        session._profile_dir = Some(profile_dir);
        Ok(session)
    }

    /// Attach to an already running page target by its WebSocket debugger URL.
    pub async fn connect(ws_url: &str) -> Result<Self> {
        tracing::info!("Connecting to page target WebSocket: {}", ws_url);

        let (ws_stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| VwsError::Cdp(format!("Failed to connect WebSocket: {}", e)))?;
        let (tx, mut rx) = StreamExt::split(ws_stream);

        let responses: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let pending = responses.clone();

        // Route responses to their waiting senders; events are ignored
        let reader = tokio::spawn(async move {
            while let Some(msg) = rx.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => {
                        if let Ok(json) = serde_json::from_str::<Value>(&text) {
                            if let Some(id) = json.get("id").and_then(|i| i.as_u64()) {
                                if let Some(sender) = pending.lock().await.remove(&id) {
                                    let _ = sender.send(json);
                                }
                                continue;
                            }
                        }
                        tracing::trace!(
                            "WS event: {}",
                            text.chars().take(100).collect::<String>()
                        );
                    }
                    Ok(WsMessage::Close(_)) => {
                        tracing::debug!("WebSocket closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!("WebSocket error: {:?}", e);
                        break;
                    }
                    _ => {}
                }
            }
        });

        let session = Self {
            ws_tx: Arc::new(Mutex::new(tx)),
            responses,
            msg_id: AtomicU64::new(1),
            reader,
            chrome: None,
            _profile_dir: None,
        };

        session.send_command("Page.enable", json!({})).await?;
        session.send_command("Runtime.enable", json!({})).await?;
        tracing::debug!("CDP domains enabled");

        Ok(session)
    }

    /// Send a CDP command and return its `result` object.
    async fn send_command(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.msg_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.responses.lock().await.insert(id, tx);

        let command = json!({
            "id": id,
            "method": method,
            "params": params
        });

        let sent = self
            .ws_tx
            .lock()
            .await
            .send(WsMessage::Text(command.to_string()))
            .await;
        if let Err(e) = sent {
            self.responses.lock().await.remove(&id);
            return Err(VwsError::Cdp(format!("Failed to send {}: {}", method, e)));
        }

        let response = match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(VwsError::Cdp("Response channel closed".to_string())),
            Err(_) => {
                self.responses.lock().await.remove(&id);
                return Err(VwsError::Cdp(format!("Command timeout: {}", method)));
            }
        };

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(VwsError::Cdp(format!("{} failed: {}", method, message)));
        }

        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn evaluate_value(&self, expression: &str) -> Result<Value> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true
                }),
            )
            .await?;
        if let Some(reason) = exception_text(&result) {
            return Err(VwsError::Cdp(format!("Evaluation failed: {}", reason)));
        }
        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Call `function` with `this` bound to the element.
    async fn call_on(
        &self,
        element: &ElementHandle,
        function: &str,
        args: Vec<Value>,
        return_by_value: bool,
    ) -> Result<Value> {
        let arguments: Vec<Value> = args.into_iter().map(|v| json!({ "value": v })).collect();
        let result = self
            .send_command(
                "Runtime.callFunctionOn",
                json!({
                    "objectId": element.id,
                    "functionDeclaration": function,
                    "arguments": arguments,
                    "returnByValue": return_by_value
                }),
            )
            .await
            // A stale object id means the element went away under us
            .map_err(|e| match e {
                VwsError::Cdp(reason) => VwsError::interaction(&element.locator, reason),
                other => other,
            })?;

        if let Some(reason) = exception_text(&result) {
            return Err(VwsError::interaction(&element.locator, reason));
        }
        Ok(result.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn wait_for_load(&self) -> Result<()> {
        let start = tokio::time::Instant::now();
        tokio::time::sleep(Duration::from_millis(500)).await;
        loop {
            let state = self.evaluate_value("document.readyState").await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if start.elapsed() > PAGE_LOAD_TIMEOUT {
                return Err(VwsError::Timeout {
                    what: "page load".to_string(),
                    timeout: PAGE_LOAD_TIMEOUT,
                });
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        let result = self
            .send_command("Page.navigate", json!({ "url": url }))
            .await?;
        if let Some(error) = result.get("errorText").and_then(|e| e.as_str()) {
            return Err(VwsError::Cdp(format!(
                "Navigation to {} failed: {}",
                url, error
            )));
        }
        self.wait_for_load().await?;
        tracing::info!("Navigated to: {}", url);
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle> {
        let expression = format!(
            "({})(document, {})",
            finder_js(locator.by),
            Value::String(locator.value.clone())
        );
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": false
                }),
            )
            .await?;
        if let Some(reason) = exception_text(&result) {
            return Err(VwsError::Cdp(format!(
                "Lookup of {} failed: {}",
                locator, reason
            )));
        }
        remote_element(result.get("result"), locator)
    }

    async fn find_child(&self, parent: &ElementHandle, locator: &Locator) -> Result<ElementHandle> {
        let function = format!(
            "function(value) {{ return ({})(this, value); }}",
            finder_js(locator.by)
        );
        let result = self
            .call_on(
                parent,
                &function,
                vec![Value::String(locator.value.clone())],
                false,
            )
            .await?;
        remote_element(Some(&result), locator)
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.call_on(element, FOCUS_JS, vec![], true).await?;
        self.send_command("Input.insertText", json!({ "text": text }))
            .await?;
        tracing::debug!("Typed {} chars into {}", text.chars().count(), element.locator);
        Ok(())
    }

    async fn press_key(&self, element: &ElementHandle, key: Key) -> Result<()> {
        self.call_on(element, FOCUS_JS, vec![], true).await?;

        let mut down = json!({
            "type": "keyDown",
            "key": key.name(),
            "code": key.name(),
            "windowsVirtualKeyCode": key.key_code()
        });
        if let Some(text) = key.text() {
            down["text"] = Value::String(text.to_string());
        }
        self.send_command("Input.dispatchKeyEvent", down).await?;
        self.send_command(
            "Input.dispatchKeyEvent",
            json!({
                "type": "keyUp",
                "key": key.name(),
                "code": key.name(),
                "windowsVirtualKeyCode": key.key_code()
            }),
        )
        .await?;

        tracing::debug!("Pressed {} on {}", key.name(), element.locator);
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.call_on(element, CLICK_JS, vec![], true).await?;
        tracing::debug!("Clicked element: {}", element.locator);
        Ok(())
    }

    async fn submit(&self, element: &ElementHandle) -> Result<()> {
        self.call_on(element, SUBMIT_JS, vec![], true).await?;
        tracing::debug!("Submitted form of {}", element.locator);
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let value = self.call_on(element, TEXT_JS, vec![], true).await?;
        Ok(value
            .get("value")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn release(&self, element: &ElementHandle) -> Result<()> {
        self.send_command(
            "Runtime.releaseObject",
            json!({ "objectId": element.id }),
        )
        .await?;
        tracing::trace!("Released {}", element.locator);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        {
            let mut tx = self.ws_tx.lock().await;
            let _ = tx.close().await;
        }
        self.reader.abort();

        if let Some(mut child) = self.chrome.take() {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill Chrome: {}", e);
            }
        }

        tracing::info!("CDP session closed");
        Ok(())
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        // Chrome itself goes with kill_on_drop
        self.reader.abort();
    }
}

/// Poll the DevTools HTTP endpoint until a page target shows up.
async fn discover_page_target(cdp_port: u16, max_retries: u32) -> Result<String> {
    let list_url = format!("http://127.0.0.1:{}/json/list", cdp_port);
    let mut last_error = String::new();

    for attempt in 1..=max_retries {
        tokio::time::sleep(LAUNCH_POLL_INTERVAL).await;

        match reqwest::get(&list_url).await {
            Ok(response) if response.status().is_success() => {
                match response.json::<Value>().await {
                    Ok(targets) => match page_ws_url(&targets) {
                        Some(url) => return Ok(url),
                        None => last_error = "No page target found".to_string(),
                    },
                    Err(e) => last_error = format!("Failed to parse targets response: {}", e),
                }
            }
            Ok(response) => last_error = format!("HTTP error: {}", response.status()),
            Err(e) => last_error = format!("Connection error: {}", e),
        }

        tracing::debug!("Retry {}/{}: {}", attempt, max_retries, last_error);
    }

    Err(VwsError::Launch(format!(
        "Failed to connect to Chrome after {} retries: {}",
        max_retries, last_error
    )))
}

/// WebSocket URL of the first `page` target in a `/json/list` response.
fn page_ws_url(targets: &Value) -> Option<String> {
    targets
        .as_array()?
        .iter()
        .find(|t| t.get("type").and_then(|v| v.as_str()) == Some("page"))?
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn exception_text(result: &Value) -> Option<String> {
    let details = result.get("exceptionDetails")?;
    let text = details
        .get("exception")
        .and_then(|e| e.get("description"))
        .or_else(|| details.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or("JavaScript exception");
    Some(text.to_string())
}

fn remote_element(remote: Option<&Value>, locator: &Locator) -> Result<ElementHandle> {
    let remote = remote.ok_or_else(|| VwsError::not_found(locator))?;
    if remote.get("subtype").and_then(|s| s.as_str()) == Some("null") {
        return Err(VwsError::not_found(locator));
    }
    match remote.get("objectId").and_then(|id| id.as_str()) {
        Some(object_id) => Ok(ElementHandle::new(object_id, locator.clone())),
        None => Err(VwsError::not_found(locator)),
    }
}

/// JavaScript `(root, value) => Element | null` for a strategy.
fn finder_js(by: By) -> &'static str {
    match by {
        By::Id => {
            "(root, value) => root === document \
             ? document.getElementById(value) \
             : root.querySelector('#' + CSS.escape(value))"
        }
        By::ClassName => "(root, value) => root.getElementsByClassName(value)[0] || null",
        By::LinkText => {
            "(root, value) => Array.from(root.querySelectorAll('a')) \
             .find(a => (a.innerText || a.textContent || '').trim() === value) || null"
        }
        By::XPath => {
            "(root, value) => document.evaluate(value, root, null, \
             XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"
        }
    }
}

const CLICK_JS: &str = r#"function() {
    if (!this.isConnected) throw new Error('element is detached');
    if (this.disabled) throw new Error('element is disabled');
    const rect = this.getBoundingClientRect();
    if (rect.width === 0 && rect.height === 0) throw new Error('element is not visible');
    this.scrollIntoView({ block: 'center' });
    this.click();
    return true;
}"#;

const FOCUS_JS: &str = r#"function() {
    if (!this.isConnected) throw new Error('element is detached');
    if (this.disabled || this.readOnly) throw new Error('element is not editable');
    this.focus();
    return true;
}"#;

const SUBMIT_JS: &str = r#"function() {
    const form = this.form || this.closest('form');
    if (!form) throw new Error('element is not inside a form');
    if (form.requestSubmit) { form.requestSubmit(); } else { form.submit(); }
    return true;
}"#;

const TEXT_JS: &str = r#"function() {
    return (this.innerText || this.value || this.textContent || '').trim();
}"#;
