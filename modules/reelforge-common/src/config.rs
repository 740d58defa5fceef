use std::env;

/// Application configuration loaded from environment variables.
///
/// Provider credentials are all optional: a missing key removes that
/// provider from the fallback chain at request time rather than failing
/// startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    // Media providers
    pub nvidia_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub huggingface_api_key: Option<String>,

    // Music catalog
    pub pixabay_api_key: Option<String>,

    // Web server
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            nvidia_api_key: optional_env(&["NVIDIA_API_KEY"]),
            gemini_api_key: optional_env(&["GEMINI_API_KEY"]),
            // Hugging Face tokens appear under several historical names.
            huggingface_api_key: optional_env(&[
                "HUGGINGFACE_API_KEY",
                "HF_TOKEN",
                "HUGGINGFACEHUB_API_TOKEN",
            ]),
            pixabay_api_key: optional_env(&["PIXABAY_API_KEY"]),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
        }
    }
}

/// First non-empty value among the candidate variable names.
fn optional_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| env::var(k).ok())
        .find(|v| !v.trim().is_empty())
}
