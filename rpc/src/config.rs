//! Development backend settings.

use serde::{Deserialize, Serialize};

/// The `[server]` table of the client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Account created at startup so an admin can log in.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

fn default_port() -> u16 {
    5000
}

fn default_admin_email() -> String {
    "admin@ballot.local".to_string()
}

fn default_admin_password() -> String {
    "admin".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            admin_name: default_admin_name(),
        }
    }
}
