//! Service configuration.

/// Configuration shared by the services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum username length in characters (default: 16). Applies to
    /// both username updates and the candidate derived at first sync.
    pub max_username_len: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_username_len: 16,
        }
    }
}
