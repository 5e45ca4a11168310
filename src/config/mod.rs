//! Configuration module for handling environment variables and .env files

use crate::client::{VkClient, DEFAULT_API_VERSION};
use dotenv::dotenv;
use log::info;
use std::env;

/// Application configuration derived from environment variables and .env file
#[derive(Debug, Clone)]
pub struct AppConfig {
    // VK API credentials
    pub access_token: Option<String>,

    // VK API settings
    pub api_version: String,

    // Run parameters (optional; the CLI prompts for anything missing)
    pub group_domain: Option<String>,
    pub post_count: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            group_domain: None,
            post_count: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn load() -> Self {
        // Try to load .env file, but continue even if it doesn't exist
        match dotenv() {
            Ok(_) => info!("Loaded environment from .env file"),
            Err(_) => info!("No .env file found, using system environment variables only"),
        }

        let mut config = Self::default();

        if let Ok(access_token) = env::var("VK_ACCESS_TOKEN") {
            config.access_token = Some(access_token);
        }

        if let Ok(api_version) = env::var("VK_API_VERSION") {
            config.api_version = api_version;
        }

        if let Ok(group_domain) = env::var("VK_GROUP_DOMAIN") {
            config.group_domain = Some(group_domain);
        }

        // Post count - parse as usize if provided
        if let Ok(count_str) = env::var("VK_POST_COUNT") {
            if let Ok(count) = count_str.parse::<usize>() {
                config.post_count = Some(count);
            }
        }

        config
    }

    /// Create a VkClient from this configuration and a resolved access token
    pub fn create_client(&self, access_token: String) -> VkClient {
        VkClient::with_api_version(access_token, self.api_version.clone())
    }
}
