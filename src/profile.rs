//! Player profiles and the document store behind them
//!
//! The store is an external collaborator: a keyed collection of user
//! documents with lookup by display name and a descending high-score range
//! read. Gameplay never waits on it; a failed high-score write is logged and
//! the run stays over.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted user ID
pub const MAX_ID_LEN: usize = 64;

/// A user document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Older documents may lack the field; they read as zero
    #[serde(rename = "highScore", default)]
    pub high_score: u64,
}

/// Store-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("User ID not found. Please register.")]
    NotFound,
    #[error("User ID already exists. Please login.")]
    AlreadyExists,
    #[error("Display Name is already taken. Please choose another.")]
    NameTaken,
    #[error("score store unavailable: {0}")]
    Unavailable(String),
    #[error("score store data is corrupt: {0}")]
    Corrupt(String),
}

/// Login/registration failures, shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("User ID is required.")]
    MissingId,
    #[error("User ID must be at most 64 characters and cannot contain '/'.")]
    MalformedId,
    #[error("Name is required for registration.")]
    MissingName,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Document store holding user profiles
pub trait ProfileStore {
    fn get_user(&self, id: &str) -> Result<UserProfile, StoreError>;

    /// Create a profile with a zero high score
    fn create_user(&mut self, id: &str, display_name: &str) -> Result<UserProfile, StoreError>;

    fn find_by_name(&self, display_name: &str) -> Result<Option<UserProfile>, StoreError>;

    fn update_high_score(&mut self, id: &str, value: u64) -> Result<(), StoreError>;

    /// Up to `limit` profiles, highest score first
    fn list_top_scores(&self, limit: usize) -> Result<Vec<UserProfile>, StoreError>;
}

/// Sort profiles for a leaderboard: score descending, then ID for stability
fn rank_profiles(mut users: Vec<UserProfile>, limit: usize) -> Vec<UserProfile> {
    users.sort_by(|a, b| b.high_score.cmp(&a.high_score).then_with(|| a.id.cmp(&b.id)));
    users.truncate(limit);
    users
}

/// In-process store, used natively and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: BTreeMap<String, UserProfile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document directly
    pub fn insert(&mut self, profile: UserProfile) {
        self.users.insert(profile.id.clone(), profile);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl ProfileStore for MemoryStore {
    fn get_user(&self, id: &str) -> Result<UserProfile, StoreError> {
        self.users.get(id).cloned().ok_or(StoreError::NotFound)
    }

    fn create_user(&mut self, id: &str, display_name: &str) -> Result<UserProfile, StoreError> {
        if self.users.contains_key(id) {
            return Err(StoreError::AlreadyExists);
        }
        let profile = UserProfile {
            id: id.to_string(),
            display_name: display_name.to_string(),
            high_score: 0,
        };
        self.users.insert(id.to_string(), profile.clone());
        Ok(profile)
    }

    fn find_by_name(&self, display_name: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .users
            .values()
            .find(|u| u.display_name == display_name)
            .cloned())
    }

    fn update_high_score(&mut self, id: &str, value: u64) -> Result<(), StoreError> {
        let user = self.users.get_mut(id).ok_or(StoreError::NotFound)?;
        user.high_score = value;
        Ok(())
    }

    fn list_top_scores(&self, limit: usize) -> Result<Vec<UserProfile>, StoreError> {
        Ok(rank_profiles(self.users.values().cloned().collect(), limit))
    }
}

/// Browser store: the whole user collection as one JSON document in
/// LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "ruralRunner_users";

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("LocalStorage is not accessible".into()))
    }

    fn load(&self) -> Result<BTreeMap<String, UserProfile>, StoreError> {
        let storage = Self::storage()?;
        let json = storage
            .get_item(Self::STORAGE_KEY)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        match json {
            Some(json) => {
                let users: Vec<UserProfile> =
                    serde_json::from_str(&json).map_err(|e| StoreError::Corrupt(e.to_string()))?;
                Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
            }
            None => Ok(BTreeMap::new()),
        }
    }

    fn save(&self, users: &BTreeMap<String, UserProfile>) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let docs: Vec<&UserProfile> = users.values().collect();
        let json = serde_json::to_string(&docs).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl ProfileStore for LocalStorageStore {
    fn get_user(&self, id: &str) -> Result<UserProfile, StoreError> {
        self.load()?.remove(id).ok_or(StoreError::NotFound)
    }

    fn create_user(&mut self, id: &str, display_name: &str) -> Result<UserProfile, StoreError> {
        let mut users = self.load()?;
        if users.contains_key(id) {
            return Err(StoreError::AlreadyExists);
        }
        let profile = UserProfile {
            id: id.to_string(),
            display_name: display_name.to_string(),
            high_score: 0,
        };
        users.insert(id.to_string(), profile.clone());
        self.save(&users)?;
        Ok(profile)
    }

    fn find_by_name(&self, display_name: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .load()?
            .into_values()
            .find(|u| u.display_name == display_name))
    }

    fn update_high_score(&mut self, id: &str, value: u64) -> Result<(), StoreError> {
        let mut users = self.load()?;
        let user = users.get_mut(id).ok_or(StoreError::NotFound)?;
        user.high_score = value;
        self.save(&users)
    }

    fn list_top_scores(&self, limit: usize) -> Result<Vec<UserProfile>, StoreError> {
        Ok(rank_profiles(self.load()?.into_values().collect(), limit))
    }
}

/// Trim and check a user ID
pub fn validate_id(raw: &str) -> Result<&str, AuthError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(AuthError::MissingId);
    }
    if id.chars().count() > MAX_ID_LEN || id.contains('/') {
        return Err(AuthError::MalformedId);
    }
    Ok(id)
}

/// What happened to a finished run's score
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighScoreWrite {
    /// Playing as a guest; nothing to persist
    Guest,
    /// Score did not beat the cached best
    NotABest,
    Saved(u64),
    /// Cache was updated but the store write failed
    Failed { value: u64, reason: String },
}

/// The signed-in player, if any
#[derive(Debug, Clone, Default)]
pub struct Session {
    profile: Option<UserProfile>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.profile.is_some()
    }

    /// Cached best score, zero for guests
    pub fn best_score(&self) -> u64 {
        self.profile.as_ref().map_or(0, |p| p.high_score)
    }

    /// Create a new account and sign in with it
    pub fn register<S: ProfileStore>(
        &mut self,
        store: &mut S,
        raw_id: &str,
        raw_name: &str,
    ) -> Result<&UserProfile, AuthError> {
        let id = validate_id(raw_id)?;
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }

        match store.get_user(id) {
            Ok(_) => return Err(StoreError::AlreadyExists.into()),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        if store.find_by_name(name)?.is_some() {
            return Err(StoreError::NameTaken.into());
        }

        let profile = store.create_user(id, name)?;
        log::info!("Registered {} ({})", profile.display_name, profile.id);
        Ok(self.profile.insert(profile))
    }

    /// Sign in with an existing account
    pub fn login<S: ProfileStore>(
        &mut self,
        store: &S,
        raw_id: &str,
    ) -> Result<&UserProfile, AuthError> {
        let id = validate_id(raw_id)?;
        let profile = store.get_user(id)?;
        log::info!(
            "Logged in {} with high score {}",
            profile.display_name,
            profile.high_score
        );
        Ok(self.profile.insert(profile))
    }

    pub fn logout(&mut self) {
        if let Some(profile) = self.profile.take() {
            log::info!("Logged out {}", profile.id);
        }
    }

    /// Persist a finished run's score if it beats the cached best.
    ///
    /// The cached best is raised before the write, and a failed write is
    /// reported rather than rolled back.
    pub fn record_run<S: ProfileStore>(&mut self, store: &mut S, final_score: u64) -> HighScoreWrite {
        let Some(profile) = self.profile.as_mut() else {
            return HighScoreWrite::Guest;
        };
        if final_score <= profile.high_score {
            return HighScoreWrite::NotABest;
        }

        profile.high_score = final_score;
        match store.update_high_score(&profile.id, final_score) {
            Ok(()) => {
                log::info!("New high score saved: {final_score}");
                HighScoreWrite::Saved(final_score)
            }
            Err(e) => {
                log::error!("Error saving high score {final_score}: {e}");
                HighScoreWrite::Failed {
                    value: final_score,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(users: &[(&str, &str, u64)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (id, name, score) in users {
            store.insert(UserProfile {
                id: id.to_string(),
                display_name: name.to_string(),
                high_score: *score,
            });
        }
        store
    }

    #[test]
    fn test_register_then_login() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        let profile = session.register(&mut store, "  farmer1 ", " Ada ").unwrap();
        assert_eq!(profile.id, "farmer1");
        assert_eq!(profile.display_name, "Ada");
        assert_eq!(profile.high_score, 0);

        session.logout();
        assert!(!session.is_signed_in());
        assert_eq!(session.best_score(), 0);

        session.login(&store, "farmer1").unwrap();
        assert_eq!(session.profile().unwrap().display_name, "Ada");
    }

    #[test]
    fn test_register_rejections() {
        let mut store = store_with(&[("taken", "Bea", 10)]);
        let mut session = Session::new();

        assert_eq!(
            session.register(&mut store, "   ", "X").unwrap_err(),
            AuthError::MissingId
        );
        assert_eq!(
            session.register(&mut store, "new", "  ").unwrap_err(),
            AuthError::MissingName
        );
        assert_eq!(
            session.register(&mut store, "a/b", "X").unwrap_err(),
            AuthError::MalformedId
        );
        assert_eq!(
            session.register(&mut store, "taken", "X").unwrap_err(),
            AuthError::Store(StoreError::AlreadyExists)
        );
        assert_eq!(
            session.register(&mut store, "new", "Bea").unwrap_err(),
            AuthError::Store(StoreError::NameTaken)
        );
        assert!(!session.is_signed_in());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_login_unknown_user() {
        let store = MemoryStore::new();
        let mut session = Session::new();
        let err = session.login(&store, "ghost").unwrap_err();
        assert_eq!(err, AuthError::Store(StoreError::NotFound));
        assert_eq!(err.to_string(), "User ID not found. Please register.");
    }

    #[test]
    fn test_record_run_only_raises() {
        let mut store = store_with(&[("u", "Cy", 300)]);
        let mut session = Session::new();
        session.login(&store, "u").unwrap();

        assert_eq!(session.record_run(&mut store, 200), HighScoreWrite::NotABest);
        assert_eq!(session.record_run(&mut store, 300), HighScoreWrite::NotABest);
        assert_eq!(session.record_run(&mut store, 500), HighScoreWrite::Saved(500));
        assert_eq!(session.best_score(), 500);
        assert_eq!(store.get_user("u").unwrap().high_score, 500);
    }

    #[test]
    fn test_record_run_as_guest() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        assert_eq!(session.record_run(&mut store, 999), HighScoreWrite::Guest);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_write_keeps_optimistic_cache() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        session.register(&mut store, "u", "Di").unwrap();
        // Document vanished server-side
        let mut empty = MemoryStore::new();

        let result = session.record_run(&mut empty, 50);
        assert!(matches!(result, HighScoreWrite::Failed { value: 50, .. }));
        assert_eq!(session.best_score(), 50);
    }

    #[test]
    fn test_top_scores_order() {
        let store = store_with(&[("a", "A", 10), ("b", "B", 30), ("c", "C", 20), ("d", "D", 30)]);
        let top = store.list_top_scores(3).unwrap();
        let ids: Vec<_> = top.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "c"]);
    }

    #[test]
    fn test_document_shape() {
        let doc = r#"{ "id": "u1", "name": "Eve" }"#;
        let profile: UserProfile = serde_json::from_str(doc).unwrap();
        assert_eq!(profile.high_score, 0);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["name"], "Eve");
        assert_eq!(json["highScore"], 0);
    }
}
