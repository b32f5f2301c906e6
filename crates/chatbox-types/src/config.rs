//! Global configuration types for Chatbox.
//!
//! `ChatboxConfig` represents the top-level `config.toml`. It is loaded once at
//! process start and passed by reference to whatever needs it; nothing reads
//! settings lazily from a global.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration. All fields have defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatboxConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Page size bounds for each paginated feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_message_page_size")]
    pub messages: PageSizeConfig,

    #[serde(default = "default_chat_page_size")]
    pub chats: PageSizeConfig,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            messages: default_message_page_size(),
            chats: default_chat_page_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

fn default_message_page_size() -> PageSizeConfig {
    PageSizeConfig {
        default_page_size: 20,
        max_page_size: 200,
    }
}

fn default_chat_page_size() -> PageSizeConfig {
    PageSizeConfig {
        default_page_size: 40,
        max_page_size: 200,
    }
}

/// Input length limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_message_text_max_length")]
    pub message_text_max_length: usize,

    #[serde(default = "default_group_name_max_length")]
    pub group_name_max_length: usize,
}

fn default_message_text_max_length() -> usize {
    5000
}

fn default_group_name_max_length() -> usize {
    100
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            message_text_max_length: default_message_text_max_length(),
            group_name_max_length: default_group_name_max_length(),
        }
    }
}

impl ChatboxConfig {
    /// Reject configurations that parse but cannot be served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_page_size("pagination.messages", &self.pagination.messages)?;
        check_page_size("pagination.chats", &self.pagination.chats)?;

        if self.limits.message_text_max_length == 0 {
            return Err(ConfigError::Invalid(
                "limits.message_text_max_length must be at least 1".to_string(),
            ));
        }
        if self.limits.group_name_max_length == 0 {
            return Err(ConfigError::Invalid(
                "limits.group_name_max_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_page_size(section: &str, sizes: &PageSizeConfig) -> Result<(), ConfigError> {
    if sizes.default_page_size == 0 {
        return Err(ConfigError::Invalid(format!(
            "{section}.default_page_size must be at least 1"
        )));
    }
    if sizes.default_page_size > sizes.max_page_size {
        return Err(ConfigError::Invalid(format!(
            "{section}.default_page_size ({}) exceeds max_page_size ({})",
            sizes.default_page_size, sizes.max_page_size
        )));
    }
    Ok(())
}
