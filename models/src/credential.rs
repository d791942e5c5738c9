use common::RedactedSecret;

use serde::{Deserialize, Serialize};

/// Where a credential lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    /// Ephemeral, cleared when the session (tab, process) ends.
    Session,
    /// Durable across sessions.
    Persistent,
}

/// A credential read back from storage, tagged with the tier that served it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub key: String,
    pub value: RedactedSecret,
    pub tier: StorageTier,
}
