use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{protocol_url, ProtocolUrl};
use crate::error::PathHubError;

/// A shared path as held by the link-issuing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePath {
    /// Opaque share token used in `/s/{id}` links
    pub id: String,
    /// Path exactly as submitted (trimmed)
    pub original_path: String,
    pub created_at: DateTime<Utc>,
    /// Number of times the share page was viewed
    pub access_count: u64,
}

impl SharePath {
    /// Create a record for `path`. The path is trimmed and must not be empty.
    pub fn new(id: impl Into<String>, path: &str) -> Result<Self, PathHubError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(PathHubError::Validation(
                "file path must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: id.into(),
            original_path: trimmed.to_string(),
            created_at: Utc::now(),
            access_count: 0,
        })
    }

    pub fn protocol_url(&self) -> ProtocolUrl {
        protocol_url(&self.original_path)
    }
}

/// Persistence for share records.
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Store a new record. Fails if the id is already taken.
    async fn insert(&self, share: SharePath) -> Result<(), PathHubError>;

    async fn get(&self, id: &str) -> Result<Option<SharePath>, PathHubError>;

    /// Increment the access counter and return the updated record.
    async fn record_access(&self, id: &str) -> Result<SharePath, PathHubError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_path() {
        let share = SharePath::new("abc", "  C:\\Users\\a.txt \n").unwrap();
        assert_eq!(share.original_path, "C:\\Users\\a.txt");
        assert_eq!(share.access_count, 0);
        assert_eq!(share.protocol_url().as_str(), "pathhub://C%3A%5CUsers%5Ca.txt");
    }

    #[test]
    fn test_new_rejects_blank_path() {
        let result = SharePath::new("abc", "   ");
        assert!(matches!(result, Err(PathHubError::Validation(_))));
    }

    #[test]
    fn test_serializes_camel_case() {
        let share = SharePath::new("abc", "C:\\x").unwrap();
        let json = serde_json::to_value(&share).unwrap();
        assert_eq!(json["originalPath"], "C:\\x");
        assert_eq!(json["accessCount"], 0);
        assert!(json.get("createdAt").is_some());
    }
}
