use crate::errors::AppError;
use crate::filters::FilterState;
use crate::models::Dataset;
use crate::render::{MapSession, RenderPass};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

struct OpenSession {
    session: MapSession,
    last_seq: u64,
}

// One entry per map page load. Ids grow monotonically, so the first key is the oldest.
pub struct SessionStore {
    next_id: u64,
    capacity: usize,
    open: BTreeMap<u64, OpenSession>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            next_id: 1,
            capacity: capacity.max(1),
            open: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn open(&mut self, data: Arc<Dataset>, link_base: &str) -> u64 {
        while self.open.len() >= self.capacity {
            if let Some((evicted, _)) = self.open.pop_first() {
                debug!(session = evicted, "evicted map session");
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        self.open.insert(
            id,
            OpenSession {
                session: MapSession::new(data, link_base),
                last_seq: 0,
            },
        );
        id
    }

    pub fn render(&mut self, id: u64, seq: u64, filters: &FilterState) -> Result<RenderPass, AppError> {
        let entry = self
            .open
            .get_mut(&id)
            .ok_or_else(|| AppError::gone("map session expired, reload the page"))?;
        if seq <= entry.last_seq {
            return Err(AppError::conflict(format!(
                "render {seq} is older than render {}",
                entry.last_seq
            )));
        }
        entry.last_seq = seq;
        Ok(entry.session.render(filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Place, Wish, WishKind};
    use axum::http::StatusCode;
    use chrono::DateTime;

    fn dataset(things: &[&str]) -> Arc<Dataset> {
        let wishes = things
            .iter()
            .enumerate()
            .map(|(i, thing)| Wish {
                id: i as u64 + 1,
                name: "Jana".to_string(),
                age: None,
                place: "Brno".to_string(),
                thing: thing.to_string(),
                text: String::new(),
                price: None,
                typ: WishKind::Gift,
            })
            .collect();
        Arc::new(Dataset {
            timestamp: DateTime::from_timestamp(1_607_176_800, 0).unwrap(),
            places: vec![Place {
                name: Some("Brno".to_string()),
                coords: [49.19, 16.61],
                wishes,
            }],
            stats: None,
        })
    }

    #[test]
    fn passes_share_one_session() {
        let mut store = SessionStore::new(4);
        let id = store.open(dataset(&["Kolo", "Deka"]), "http://x");

        let first = store.render(id, 1, &FilterState::default()).unwrap();
        assert_eq!(first.removed_layers, 0);
        assert_eq!(first.layers.len(), 1);

        let second = store
            .render(id, 2, &FilterState::from_query("thing=kolo"))
            .unwrap();
        assert_eq!(second.removed_layers, 1);
        assert_eq!(second.shown, 1);
        assert_eq!(second.total, 2);
    }

    #[test]
    fn stale_sequence_is_rejected() {
        let mut store = SessionStore::new(4);
        let id = store.open(dataset(&["Kolo"]), "http://x");
        store.render(id, 3, &FilterState::default()).unwrap();

        for seq in [1, 3] {
            let err = store.render(id, seq, &FilterState::default()).unwrap_err();
            assert_eq!(err.status, StatusCode::CONFLICT);
        }
        let next = store.render(id, 4, &FilterState::default()).unwrap();
        assert_eq!(next.removed_layers, 1);
    }

    #[test]
    fn oldest_session_is_evicted_at_capacity() {
        let mut store = SessionStore::new(2);
        assert!(store.is_empty());
        let first = store.open(dataset(&["Kolo"]), "http://x");
        let second = store.open(dataset(&["Kolo"]), "http://x");
        let third = store.open(dataset(&["Kolo"]), "http://x");
        assert_eq!(store.len(), 2);

        let err = store.render(first, 1, &FilterState::default()).unwrap_err();
        assert_eq!(err.status, StatusCode::GONE);
        assert!(store.render(second, 1, &FilterState::default()).is_ok());
        assert!(store.render(third, 1, &FilterState::default()).is_ok());
    }
}
