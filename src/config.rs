use serde::Deserialize;

/// Where the student/marks REST backend lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("API_BASE_URL")
            .map_err(|_| anyhow::anyhow!("API_BASE_URL must be set"))?;
        anyhow::ensure!(!base_url.trim().is_empty(), "API_BASE_URL is empty");
        Ok(Self::new(base_url.trim()))
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
