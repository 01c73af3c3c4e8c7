//! Storage adapter for unified sessions

use super::state::{SessionId, UnifiedSession};
use crate::storage::types::{SessionFilter as StorageSessionFilter, SessionState as StorageSessionState};
use anyhow::Result;

/// Adapter to bridge unified sessions with storage layer
pub struct SessionStorageAdapter;

impl SessionStorageAdapter {
    /// Convert unified session to storage session state
    pub fn to_storage_state(_session: &UnifiedSession) -> StorageSessionState {
        // Map unified session status to storage session state
        StorageSessionState::InProgress // Simplified for now
    }

    /// Convert storage session state to unified session
    pub fn from_storage_state(_state: StorageSessionState, _id: SessionId) -> Result<UnifiedSession> {
        // This would need proper implementation based on actual storage format
        unimplemented!("Storage state conversion not yet implemented")
    }

    /// Convert unified filter to storage filter
    pub fn to_storage_filter(_filter: &super::state::SessionFilter) -> StorageSessionFilter {
        StorageSessionFilter::default()
    }
}