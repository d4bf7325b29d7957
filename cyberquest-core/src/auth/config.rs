//! Configuration for identity resolution

use serde::{Deserialize, Serialize};

/// Which request headers the upstream proxy uses to forward identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Header carrying the caller's subject identifier
    #[serde(default = "default_subject_header")]
    pub subject_header: String,

    /// Header carrying the caller's display name
    #[serde(default = "default_name_header")]
    pub name_header: String,
}

fn default_subject_header() -> String {
    "x-auth-subject".to_string()
}

fn default_name_header() -> String {
    "x-auth-name".to_string()
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            subject_header: default_subject_header(),
            name_header: default_name_header(),
        }
    }
}
