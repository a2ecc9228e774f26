use serde::{Deserialize, Serialize};

use super::RecordId;

/// A member of the admin allow-list. Appwrite admins carry no hash; their
/// credentials are checked by the Appwrite account service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: RecordId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
}
