use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, UpdateProfileInput};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
///
/// `create_user` inserts the whole row, hash included, in one statement;
/// a duplicate email surfaces as [`AuthError::Conflict`] from the unique
/// constraint, never from a prior read.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
        password_algorithm: &str,
    ) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn set_password(
        &self,
        user_id: Uuid,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<(), AuthError>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use chrono::Utc;
    use models::user::ROLE_USER;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        creds: Mutex<HashMap<Uuid, Credentials>>,
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).cloned())
        }

        async fn create_user(
            &self,
            email: &str,
            name: Option<&str>,
            password_hash: &str,
            password_algorithm: &str,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.email == email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                name: name.map(str::to_owned),
                avatar: None,
                role: ROLE_USER.to_string(),
                created_at: Utc::now().into(),
            };
            users.insert(user.id, user.clone());
            self.creds.lock().unwrap().insert(
                user.id,
                Credentials {
                    user_id: user.id,
                    password_hash: password_hash.to_string(),
                    password_algorithm: password_algorithm.to_string(),
                },
            );
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn set_password(
            &self,
            user_id: Uuid,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<(), AuthError> {
            let mut creds = self.creds.lock().unwrap();
            creds.insert(user_id, Credentials { user_id, password_hash, password_algorithm });
            Ok(())
        }

        async fn update_profile(
            &self,
            user_id: Uuid,
            input: UpdateProfileInput,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if let Some(email) = &input.email {
                if users.values().any(|u| u.id != user_id && &u.email == email) {
                    return Err(AuthError::Conflict);
                }
            }
            let user = users.get_mut(&user_id).ok_or(AuthError::NotFound)?;
            if let Some(name) = input.name {
                user.name = Some(name);
            }
            if let Some(email) = input.email {
                user.email = email;
            }
            if let Some(avatar) = input.avatar {
                user.avatar = Some(avatar);
            }
            Ok(user.clone())
        }
    }
}
