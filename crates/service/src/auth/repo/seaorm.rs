use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials, UpdateProfileInput};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

use models::user;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: user::Model) -> AuthUser {
    AuthUser {
        id: u.id,
        email: u.email,
        name: u.name,
        avatar: u.avatar,
        role: u.role,
        created_at: u.created_at,
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
        password_algorithm: &str,
    ) -> Result<AuthUser, AuthError> {
        let now = Utc::now();
        let am = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            password_algorithm: Set(password_algorithm.to_string()),
            name: Set(name.map(str::to_owned)),
            avatar: Set(None),
            role: Set(user::ROLE_USER.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let created = am.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::Conflict,
            _ => AuthError::Repository(e.to_string()),
        })?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|u| Credentials {
            user_id: u.id,
            password_hash: u.password_hash,
            password_algorithm: u.password_algorithm,
        }))
    }

    async fn set_password(
        &self,
        user_id: Uuid,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<(), AuthError> {
        let existing = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::NotFound)?;
        let mut am: user::ActiveModel = existing.into();
        am.password_hash = Set(password_hash);
        am.password_algorithm = Set(password_algorithm);
        am.updated_at = Set(Utc::now().into());
        am.update(&self.db).await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<AuthUser, AuthError> {
        let existing = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::NotFound)?;
        let mut am: user::ActiveModel = existing.into();
        if let Some(name) = input.name {
            am.name = Set(Some(name));
        }
        if let Some(email) = input.email {
            am.email = Set(email);
        }
        if let Some(avatar) = input.avatar {
            am.avatar = Set(Some(avatar));
        }
        am.updated_at = Set(Utc::now().into());
        // The unique index on email is the arbiter for collisions.
        let updated = am.update(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::Conflict,
            _ => AuthError::Repository(e.to_string()),
        })?;
        Ok(to_auth_user(updated))
    }
}
