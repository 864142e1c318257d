// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthError, AuthService, DirectoryAuthenticator, LdapDirectory};
use crate::config::AppConfig;
use crate::storage::{ActivityStore, AppDatabase, OutletStore, SessionStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<AppDatabase>,
    pub users: UserStore,
    pub outlets: OutletStore,
    pub activity: ActivityStore,
    pub auth: Arc<AuthService>,
    /// bcrypt cost for new password hashes
    pub bcrypt_cost: u32,
}

impl AppState {
    /// Wire every store and the auth service onto one database.
    pub fn new(db: Arc<AppDatabase>, config: &AppConfig) -> Result<Self, AuthError> {
        let users = UserStore::new(db.clone());
        let sessions = Arc::new(SessionStore::new(db.clone()));
        let directory = config
            .directory
            .clone()
            .map(|d| Arc::new(LdapDirectory::new(d)) as Arc<dyn DirectoryAuthenticator>);

        let auth = AuthService::from_config(
            config,
            Arc::new(users.clone()),
            sessions,
            directory,
        )?;

        Ok(Self {
            users,
            outlets: OutletStore::new(db.clone()),
            activity: ActivityStore::new(db.clone()),
            auth: Arc::new(auth),
            bcrypt_cost: config.bcrypt_cost,
            db,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::storage::{StoredUser, UserStatus};
    use chrono::Utc;
    use tempfile::TempDir;

    /// Minimum bcrypt cost; keeps tests fast.
    pub const TEST_BCRYPT_COST: u32 = 4;

    pub fn test_config(data_dir: &std::path::Path) -> AppConfig {
        AppConfig::from_lookup(|name| match name {
            "JWT_SIGNING_KEY" => Some("test-signing-key-0123456789abcdef".to_string()),
            "REFRESH_TOKEN_KEY" => Some("0123456789abcdef0123456789abcdef".to_string()),
            "BCRYPT_COST" => Some(TEST_BCRYPT_COST.to_string()),
            "DATA_DIR" => Some(data_dir.display().to_string()),
            _ => None,
        })
        .unwrap()
    }

    /// State over a fresh database in a temp dir. Keep the dir alive.
    pub fn test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let db = AppDatabase::open(&config.database_path()).unwrap();
        let state = AppState::new(Arc::new(db), &config).unwrap();
        (state, temp_dir)
    }

    /// Insert an active group-1 user with the given password.
    pub async fn seed_user(state: &AppState, username: &str, password: &str) -> StoredUser {
        let now = Utc::now();
        let user = StoredUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            phone: "0123456789".to_string(),
            password_hash: Some(hash_password(password, TEST_BCRYPT_COST).await.unwrap()),
            group: 1,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };
        state.users.create(&user).unwrap();
        user
    }
}
