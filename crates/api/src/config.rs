use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Hosted inference endpoint settings.
    pub inference: InferenceSettings,
    /// Seconds between automatic-capture due checks (default: `1`).
    pub auto_capture_tick_secs: u64,
    /// Pessimistic lease window applied when an automatic capture is
    /// dispatched, in seconds (default: `30`).
    pub auto_capture_fallback_secs: i64,
    /// Directory the polling webview is served from
    /// (default: `crates/api/static`).
    pub webview_dir: String,
}

/// Connection settings for the hosted face-detection endpoint.
#[derive(Debug, Clone)]
pub struct InferenceSettings {
    /// Base HTTP URL of the inference service.
    pub api_url: String,
    /// Model path segment appended to the base URL.
    pub model_id: String,
    /// API key sent as the `api_key` query parameter.
    pub api_key: String,
}

impl InferenceSettings {
    /// Load inference settings from environment variables.
    ///
    /// | Env Var              | Required | Default                       |
    /// |----------------------|----------|-------------------------------|
    /// | `INFERENCE_API_URL`  | no       | `https://detect.roboflow.com` |
    /// | `INFERENCE_MODEL_ID` | no       | `face-detection-mik1i/21`     |
    /// | `INFERENCE_API_KEY`  | **yes**  | --                            |
    ///
    /// # Panics
    ///
    /// Panics if `INFERENCE_API_KEY` is not set.
    pub fn from_env() -> Self {
        let api_url = std::env::var("INFERENCE_API_URL")
            .unwrap_or_else(|_| "https://detect.roboflow.com".into());

        let model_id = std::env::var("INFERENCE_MODEL_ID")
            .unwrap_or_else(|_| "face-detection-mik1i/21".into());

        let api_key = std::env::var("INFERENCE_API_KEY")
            .expect("INFERENCE_API_KEY must be set in the environment");

        Self {
            api_url,
            model_id,
            api_key,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `AUTO_CAPTURE_TICK_SECS`     | `1`                        |
    /// | `AUTO_CAPTURE_FALLBACK_SECS` | `30`                       |
    /// | `WEBVIEW_DIR`                | `crates/api/static`        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let auto_capture_tick_secs: u64 = std::env::var("AUTO_CAPTURE_TICK_SECS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("AUTO_CAPTURE_TICK_SECS must be a valid u64");

        let auto_capture_fallback_secs: i64 = std::env::var("AUTO_CAPTURE_FALLBACK_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("AUTO_CAPTURE_FALLBACK_SECS must be a valid i64");

        let webview_dir =
            std::env::var("WEBVIEW_DIR").unwrap_or_else(|_| "crates/api/static".into());

        let jwt = JwtConfig::from_env();
        let inference = InferenceSettings::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            inference,
            auto_capture_tick_secs,
            auto_capture_fallback_secs,
            webview_dir,
        }
    }
}
