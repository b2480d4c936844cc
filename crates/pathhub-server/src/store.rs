use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pathhub_core::{PathHubError, SharePath, ShareStore};

/// Share records kept in process memory; lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryShareStore {
    shares: DashMap<String, SharePath>,
}

impl InMemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

#[async_trait]
impl ShareStore for InMemoryShareStore {
    async fn insert(&self, share: SharePath) -> Result<(), PathHubError> {
        match self.shares.entry(share.id.clone()) {
            Entry::Occupied(_) => Err(PathHubError::Validation(format!(
                "share id {} already exists",
                share.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(share);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<SharePath>, PathHubError> {
        Ok(self.shares.get(id).map(|share| share.clone()))
    }

    async fn record_access(&self, id: &str) -> Result<SharePath, PathHubError> {
        let mut share = self
            .shares
            .get_mut(id)
            .ok_or_else(|| PathHubError::NotFound(id.to_string()))?;
        share.access_count += 1;
        Ok(share.clone())
    }
}
