// webdriver.rs
use crate::scraper::ScraperError;
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The operations the crawl needs from a live browser. One session is owned
/// by exactly one crawl and driven strictly sequentially.
pub trait BrowserSession {
    /// Load `url` in the current tab.
    fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// Block until at least one element matches `css`, or fail with
    /// `ScraperError::Timeout` once `timeout` has passed.
    fn wait_for(&mut self, css: &str, timeout: Duration) -> Result<(), ScraperError>;

    /// Current DOM serialized as HTML.
    fn page_source(&mut self) -> Result<String, ScraperError>;

    /// End the session. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), ScraperError>;
}

/// A Chrome session behind a W3C WebDriver endpoint (chromedriver).
pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: Option<String>,
}

impl WebDriverSession {
    /// Ask the driver at `endpoint` for a new Chrome session.
    pub fn start(endpoint: &str, headless: bool) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ScraperError::DriverInit(e.to_string()))?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        let value = send(
            &client,
            Method::POST,
            &format!("{endpoint}/session"),
            Some(capabilities(headless)),
        )
        .map_err(|e| ScraperError::DriverInit(e.to_string()))?;

        let session_id = value
            .pointer("/value/sessionId")
            .and_then(|v| v.as_str())
            .or_else(|| value.pointer("/sessionId").and_then(|v| v.as_str()))
            .ok_or_else(|| {
                ScraperError::DriverInit(format!(
                    "session id missing in response: {}",
                    truncate_for_log(&value.to_string(), 220)
                ))
            })?
            .to_string();

        tracing::info!(%session_id, %endpoint, "webdriver session started");

        Ok(Self {
            client,
            endpoint,
            session_id: Some(session_id),
        })
    }

    fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ScraperError> {
        let session_id = self
            .session_id
            .as_deref()
            .ok_or_else(|| ScraperError::SessionLost("session already closed".into()))?;
        let url = format!("{}/session/{}{}", self.endpoint, session_id, path);

        send(&self.client, method, &url, body).map_err(|e| match e {
            // The driver is gone; nothing later in the run can succeed.
            ScraperError::Network(msg) => ScraperError::SessionLost(msg),
            ScraperError::WebDriver { name, message } if name == "invalid session id" => {
                ScraperError::SessionLost(message)
            }
            other => other,
        })
    }

    fn find_elements(&self, css: &str) -> Result<usize, ScraperError> {
        let value = self.command(
            Method::POST,
            "/elements",
            Some(json!({ "using": "css selector", "value": css })),
        )?;
        Ok(value
            .pointer("/value")
            .and_then(|v| v.as_array())
            .map(|arr| arr.len())
            .unwrap_or(0))
    }
}

impl BrowserSession for WebDriverSession {
    fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))?;
        Ok(())
    }

    fn wait_for(&mut self, css: &str, timeout: Duration) -> Result<(), ScraperError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.find_elements(css)? > 0 {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ScraperError::Timeout(css.to_string()));
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    fn page_source(&mut self) -> Result<String, ScraperError> {
        let value = self.command(Method::GET, "/source", None)?;
        Ok(value
            .pointer("/value")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    fn close(&mut self) -> Result<(), ScraperError> {
        let Some(session_id) = self.session_id.take() else {
            return Ok(());
        };
        let url = format!("{}/session/{}", self.endpoint, session_id);
        send(&self.client, Method::DELETE, &url, None)?;
        tracing::info!(%session_id, "webdriver session closed");
        Ok(())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if self.session_id.is_some() {
            if let Err(e) = self.close() {
                tracing::warn!("failed to close webdriver session on drop: {e}");
            }
        }
    }
}

/// Send one WebDriver command and unwrap the `{"value": ...}` envelope's
/// error form.
fn send(client: &Client, method: Method, url: &str, body: Option<Value>) -> Result<Value, ScraperError> {
    let mut req = client.request(method, url);
    if let Some(body) = body {
        req = req.json(&body);
    }

    let res = req.send().map_err(|e| ScraperError::Network(e.to_string()))?;
    let status = res.status();
    let text = res.text().map_err(|e| ScraperError::Network(e.to_string()))?;
    let value: Value = serde_json::from_str(&text).unwrap_or_default();

    if let Some(name) = value.pointer("/value/error").and_then(|v| v.as_str()) {
        let message = value
            .pointer("/value/message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown webdriver error");
        return Err(ScraperError::WebDriver {
            name: name.to_string(),
            message: truncate_for_log(message, 240),
        });
    }
    if !status.is_success() {
        return Err(ScraperError::WebDriver {
            name: format!("HTTP {}", status.as_u16()),
            message: truncate_for_log(&text, 240),
        });
    }

    Ok(value)
}

fn capabilities(headless: bool) -> Value {
    let mut args = Vec::<String>::new();
    if headless {
        args.push("--headless".to_string());
    }
    args.push("--no-sandbox".to_string());
    args.push("--disable-dev-shm-usage".to_string());
    args.push("--disable-gpu".to_string());
    args.push("--window-size=1920,1080".to_string());
    args.push("--ignore-certificate-errors".to_string());
    args.push("--disable-extensions".to_string());
    args.push("--disable-popup-blocking".to_string());
    args.push(format!("--user-agent={USER_AGENT}"));

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "acceptInsecureCerts": true,
                "timeouts": { "pageLoad": 30000 },
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

fn truncate_for_log(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    input.chars().take(max_chars).collect::<String>() + "..."
}
