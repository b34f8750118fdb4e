//! OpenAI client configuration.

use crate::config::HttpSettings;
use crate::error::Result;
use crate::http::build_client;
use async_openai::{config::OpenAIConfig, Client};

/// Create an OpenAI client for the given key and base URL, sharing the
/// configured HTTP timeout.
pub fn create_client(api_key: &str, api_base: &str, http: &HttpSettings) -> Result<Client<OpenAIConfig>> {
    let config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base.trim_end_matches('/'));

    Ok(Client::with_config(config).with_http_client(build_client(http)?))
}
