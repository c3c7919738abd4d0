use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("timed out after {timeout_secs}s waiting for `{selector}`")]
    WaitTimeout { selector: String, timeout_secs: u64 },

    #[error("navigation to {0} timed out")]
    NavigationTimeout(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
