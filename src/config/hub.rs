//! Hub configuration

use serde::Deserialize;

use super::error::ValidationError;

const MAX_MAILBOX_CAPACITY: usize = 1_000_000;

/// Hub loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Commands the mailbox buffers before submitters wait
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

impl HubConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mailbox_capacity == 0 || self.mailbox_capacity > MAX_MAILBOX_CAPACITY {
            return Err(ValidationError::InvalidMailboxCapacity);
        }
        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

fn default_mailbox_capacity() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_config_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.mailbox_capacity, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mailbox_capacity_bounds() {
        for capacity in [0, MAX_MAILBOX_CAPACITY + 1] {
            let config = HubConfig {
                mailbox_capacity: capacity,
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidMailboxCapacity));
        }

        let config = HubConfig {
            mailbox_capacity: MAX_MAILBOX_CAPACITY,
        };
        assert!(config.validate().is_ok());
    }
}
