//! In-memory storage double for tests.
//!
//! Implements all three capability ports over plain collections and counts
//! every port call, so tests can assert that invalid input never reaches
//! storage.

use super::{AppProvider, StorageError, UserProvider, UserSaver};
use crate::models::{App, User};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory implementation of the storage ports.
pub struct MockStorage {
    users: Mutex<Vec<User>>,
    admins: Mutex<HashSet<i64>>,
    apps: Mutex<HashMap<i32, App>>,
    next_user_id: AtomicI64,
    calls: AtomicUsize,
    fail: bool,
}

impl MockStorage {
    /// Empty storage; ids are assigned starting from 1.
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            admins: Mutex::new(HashSet::new()),
            apps: Mutex::new(HashMap::new()),
            next_user_id: AtomicI64::new(1),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Storage whose every port call fails with a backend error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Registers a client app, the way the external app owner would.
    pub fn add_app(&self, app: App) {
        lock(&self.apps).insert(app.id, app);
    }

    /// Sets the admin flag, the way the external storage owner would.
    pub fn set_admin(&self, user_id: i64) {
        lock(&self.admins).insert(user_id);
    }

    /// Number of port calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of stored users with this phone.
    pub fn users_with_phone(&self, phone: &str) -> usize {
        lock(&self.users).iter().filter(|u| u.phone == phone).count()
    }

    fn port_call(&self) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::Backend("mock storage failure".to_string()));
        }
        Ok(())
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait::async_trait]
impl UserSaver for MockStorage {
    async fn save_user(
        &self,
        name: &str,
        phone: &str,
        pass_hash: &str,
    ) -> Result<i64, StorageError> {
        self.port_call()?;

        let mut users = lock(&self.users);
        if users.iter().any(|u| u.phone == phone) {
            return Err(StorageError::AlreadyExists);
        }

        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        users.push(User {
            id,
            name: name.to_owned(),
            phone: phone.to_owned(),
            pass_hash: pass_hash.to_owned(),
        });

        Ok(id)
    }
}

#[async_trait::async_trait]
impl UserProvider for MockStorage {
    async fn user_by_phone(&self, phone: &str) -> Result<User, StorageError> {
        self.port_call()?;

        lock(&self.users)
            .iter()
            .find(|u| u.phone == phone)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError> {
        self.port_call()?;

        if !lock(&self.users).iter().any(|u| u.id == user_id) {
            return Err(StorageError::NotFound);
        }

        Ok(lock(&self.admins).contains(&user_id))
    }
}

#[async_trait::async_trait]
impl AppProvider for MockStorage {
    async fn app(&self, app_id: i32) -> Result<App, StorageError> {
        self.port_call()?;

        lock(&self.apps)
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}
