use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::models::{generate_room_code, normalize_code, DebateMode, Participant, Room};
use crate::shared::AppError;

/// Bounded retries on room-code collision before giving up
const MAX_CODE_ATTEMPTS: usize = 8;

/// Authoritative in-process storage for live rooms.
///
/// Each room sits behind its own mutex so mutations to a room are strictly
/// serialized while unrelated rooms never contend; the outer map lock is
/// only held long enough to find the entry. All mutation goes through
/// [`RoomStore::mutate`], which applies the closure to a draft and commits
/// only on success, so a domain error never leaves partial state behind.
pub struct RoomStore {
    rooms: RwLock<HashMap<String, Arc<Mutex<Room>>>>,
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a room under a freshly generated code, retrying a bounded
    /// number of times if a generated code is already live.
    #[instrument(skip(self, creator))]
    pub async fn create(
        &self,
        topic: String,
        mode: DebateMode,
        creator: Participant,
    ) -> Result<Room, AppError> {
        let mut rooms = self.rooms.write().await;

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_room_code();
            if rooms.contains_key(&code) {
                debug!(code = %code, "Generated code collides with a live room, retrying");
                continue;
            }

            let room = Room::new(code.clone(), topic, mode, creator);
            rooms.insert(code.clone(), Arc::new(Mutex::new(room.clone())));

            info!(code = %code, mode = %mode, "Room created");
            return Ok(room);
        }

        warn!("Exhausted room code generation attempts");
        Err(AppError::CodeCollision)
    }

    /// Inserts a room under its existing code. Test seam and admin path;
    /// normal creation goes through [`RoomStore::create`].
    pub async fn insert(&self, room: Room) -> Result<(), AppError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.code) {
            return Err(AppError::CodeCollision);
        }
        rooms.insert(room.code.clone(), Arc::new(Mutex::new(room)));
        Ok(())
    }

    /// Applies a transformation to the room under its per-room lock.
    ///
    /// The closure runs against a draft copy; on `Ok` the draft replaces the
    /// stored room, on `Err` the stored room is untouched.
    pub async fn mutate<T, F>(&self, code: &str, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Room) -> Result<T, AppError>,
    {
        let code = normalize_code(code);
        let cell = {
            let rooms = self.rooms.read().await;
            rooms
                .get(&code)
                .cloned()
                .ok_or_else(|| AppError::RoomNotFound(code.clone()))?
        };

        let mut room = cell.lock().await;
        let mut draft = room.clone();
        let out = f(&mut draft)?;
        *room = draft;
        Ok(out)
    }

    /// Point-in-time copy of a room's state
    pub async fn snapshot(&self, code: &str) -> Result<Room, AppError> {
        let code = normalize_code(code);
        let cell = {
            let rooms = self.rooms.read().await;
            rooms
                .get(&code)
                .cloned()
                .ok_or_else(|| AppError::RoomNotFound(code.clone()))?
        };
        let room = cell.lock().await;
        Ok(room.clone())
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    /// Removes rooms whose last activity is older than the threshold.
    /// Returns the codes of the removed rooms.
    #[instrument(skip(self))]
    pub async fn remove_stale(&self, threshold: Duration) -> Vec<String> {
        let Ok(threshold) = chrono::Duration::from_std(threshold) else {
            return Vec::new();
        };
        let cutoff = chrono::Utc::now() - threshold;

        let mut rooms = self.rooms.write().await;
        let mut removed = Vec::new();

        let codes: Vec<String> = rooms.keys().cloned().collect();
        for code in codes {
            let stale = {
                let cell = &rooms[&code];
                let room = cell.lock().await;
                room.last_activity < cutoff
            };
            if stale {
                rooms.remove(&code);
                removed.push(code);
            }
        }

        if !removed.is_empty() {
            info!(count = removed.len(), "Removed stale rooms");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::models::Stage;

    fn duel_room(code: &str) -> Room {
        Room::new(
            code.to_string(),
            "Test topic".to_string(),
            DebateMode::Duel,
            Participant::duelist("alice"),
        )
    }

    #[tokio::test]
    async fn test_create_and_snapshot() {
        let store = RoomStore::new();
        let room = store
            .create(
                "Cats vs dogs".to_string(),
                DebateMode::Duel,
                Participant::duelist("alice"),
            )
            .await
            .unwrap();

        assert_eq!(room.code.len(), 6);
        let snapshot = store.snapshot(&room.code).await.unwrap();
        assert_eq!(snapshot, room);
    }

    #[tokio::test]
    async fn test_snapshot_is_case_insensitive() {
        let store = RoomStore::new();
        store.insert(duel_room("ABC123")).await.unwrap();

        let snapshot = store.snapshot("abc123").await.unwrap();
        assert_eq!(snapshot.code, "ABC123");
    }

    #[tokio::test]
    async fn test_snapshot_unknown_code() {
        let store = RoomStore::new();
        let result = store.snapshot("NOPE99").await;
        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_insert_duplicate_code_collides() {
        let store = RoomStore::new();
        store.insert(duel_room("ABC123")).await.unwrap();
        let result = store.insert(duel_room("ABC123")).await;
        assert!(matches!(result, Err(AppError::CodeCollision)));
    }

    #[tokio::test]
    async fn test_mutate_commits_on_ok() {
        let store = RoomStore::new();
        store.insert(duel_room("ABC123")).await.unwrap();

        store
            .mutate("ABC123", |room| {
                room.topic = "Updated".to_string();
                Ok(())
            })
            .await
            .unwrap();

        let snapshot = store.snapshot("ABC123").await.unwrap();
        assert_eq!(snapshot.topic, "Updated");
    }

    #[tokio::test]
    async fn test_mutate_rolls_back_on_error() {
        let store = RoomStore::new();
        store.insert(duel_room("ABC123")).await.unwrap();

        let result: Result<(), AppError> = store
            .mutate("ABC123", |room| {
                // Mutation before the error must not leak into the store
                room.stage = Stage::Closed;
                room.topic = "Poisoned".to_string();
                Err(AppError::NotYourTurn("bob".to_string()))
            })
            .await;

        assert!(matches!(result, Err(AppError::NotYourTurn(_))));
        let snapshot = store.snapshot("ABC123").await.unwrap();
        assert_eq!(snapshot.stage, Stage::Open);
        assert_eq!(snapshot.topic, "Test topic");
    }

    #[tokio::test]
    async fn test_mutate_unknown_code() {
        let store = RoomStore::new();
        let result = store.mutate("NOPE99", |_room| Ok(())).await;
        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_serialized() {
        let store = Arc::new(RoomStore::new());
        store.insert(duel_room("ABC123")).await.unwrap();

        let handles = (0..50)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .mutate("ABC123", |room| {
                            room.progress_index += 1;
                            Ok(())
                        })
                        .await
                })
            })
            .collect::<Vec<_>>();

        for handle in futures::future::join_all(handles).await {
            handle.unwrap().unwrap();
        }

        let snapshot = store.snapshot("ABC123").await.unwrap();
        assert_eq!(snapshot.progress_index, 50);
    }

    #[tokio::test]
    async fn test_remove_stale() {
        let store = RoomStore::new();
        store.insert(duel_room("OLD111")).await.unwrap();
        store.insert(duel_room("NEW222")).await.unwrap();

        // Age one room artificially
        store
            .mutate("OLD111", |room| {
                room.last_activity = chrono::Utc::now() - chrono::Duration::hours(48);
                Ok(())
            })
            .await
            .unwrap();

        let removed = store.remove_stale(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(removed, vec!["OLD111".to_string()]);
        assert!(store.snapshot("OLD111").await.is_err());
        assert!(store.snapshot("NEW222").await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_stale_keeps_fresh_rooms() {
        let store = RoomStore::new();
        store.insert(duel_room("ABC123")).await.unwrap();

        let removed = store.remove_stale(Duration::from_secs(24 * 60 * 60)).await;
        assert!(removed.is_empty());
        assert_eq!(store.len().await, 1);
    }
}
