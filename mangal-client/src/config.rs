//! Client configuration

/// Client configuration for connecting to the ordering backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL with the `/api` prefix enforced
    pub api_base: String,

    /// Bearer token for authenticated calls
    pub token: Option<String>,

    /// Push-channel TCP address (host:port)
    pub message_addr: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new configuration from a raw base URL
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            api_base: ensure_api_prefix(base_url.as_ref()),
            token: None,
            message_addr: None,
            timeout: 30,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the push-channel TCP address
    pub fn with_message_addr(mut self, addr: impl Into<String>) -> Self {
        self.message_addr = Some(addr.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// Enforce the `/api` prefix on a configured base URL.
///
/// Deployments have configured this as an absolute URL, a relative path, or
/// nothing at all; requests must end up under `/api` in every case.
pub fn ensure_api_prefix(base: &str) -> String {
    let base = base.trim();
    if base.is_empty() {
        return "/api".to_string();
    }

    // Absolute URL handling
    let lowered = base.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        if let Ok(mut url) = reqwest::Url::parse(base) {
            let path = url.path().to_string();
            let new_path = if path == "/" || path.is_empty() {
                "/api".to_string()
            } else if !path.starts_with("/api") {
                format!("{}/api", path.trim_end_matches('/'))
            } else {
                path
            };
            url.set_path(&new_path);
            url.set_query(None);
            url.set_fragment(None);
            return url.to_string().trim_end_matches('/').to_string();
        }
        // fall through to relative handling
    }

    // Relative path handling
    let mut p = if base.starts_with('/') {
        base.to_string()
    } else {
        format!("/{}", base)
    };
    if !p.starts_with("/api") {
        p = format!("{}/api", p.trim_end_matches('/'));
    }
    p
}
