use crate::models::VehicleRecord;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Latest crawl results, shared between the crawler and the API.
///
/// Contents are only ever swapped wholesale, so readers see either the
/// previous crawl or the new one.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    records: Arc<RwLock<Vec<VehicleRecord>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with `records`, returning how many are now stored
    pub async fn replace(&self, records: Vec<VehicleRecord>) -> usize {
        let mut guard = self.records.write().await;
        *guard = records;
        guard.len()
    }

    pub async fn snapshot(&self) -> Vec<VehicleRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replace_drops_previous_records() {
        let store = ResultStore::new();
        store
            .replace(vec![VehicleRecord::empty("a"), VehicleRecord::empty("b")])
            .await;
        assert_eq!(store.len().await, 2);

        store.replace(vec![VehicleRecord::empty("c")]).await;
        let urls: Vec<String> = store.snapshot().await.into_iter().map(|v| v.url).collect();
        assert_eq!(urls, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn clones_share_contents() {
        let store = ResultStore::new();
        let other = store.clone();
        store.replace(vec![VehicleRecord::empty("a")]).await;
        assert!(!other.is_empty().await);
    }
}
