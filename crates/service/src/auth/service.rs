use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::validation::{validate_email, validate_password};

use super::domain::{
    AuthSession, AuthUser, ChangePasswordInput, Claims, LoginInput, RegisterInput,
    UpdateProfileInput,
};
use super::errors::AuthError;
use super::repository::AuthRepository;

pub const PASSWORD_ALGORITHM: &str = "argon2id";

/// Token issuance settings
#[derive(Debug, Clone)]
pub struct AuthTokenConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthTokenConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthTokenConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new user and open a session.
    ///
    /// The user row is inserted in a single statement; a concurrent
    /// registration with the same email loses on the unique constraint
    /// and gets `Conflict`, never a partial write.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        validate_email(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        validate_password(&input.password).map_err(|e| AuthError::Validation(e.to_string()))?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(input.email.trim(), input.name.as_deref(), &hash, PASSWORD_ALGORITHM)
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");

        let token = self.issue_token(&user)?;
        Ok(AuthSession { token, user })
    }

    /// Authenticate and issue a token. Unknown email and wrong password
    /// are indistinguishable to the caller.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .repo
            .find_user_by_email(input.email.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo.get_credentials(user.id).await?.ok_or(AuthError::Unauthorized)?;
        let parsed =
            PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        Ok(AuthSession { token, user })
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        mut input: UpdateProfileInput,
    ) -> Result<AuthUser, AuthError> {
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AuthError::Validation("name must not be empty".into()));
            }
        }
        if let Some(email) = input.email.take() {
            let email = email.trim().to_string();
            validate_email(&email).map_err(|e| AuthError::Validation(e.to_string()))?;
            input.email = Some(email);
        }
        self.repo.update_profile(user_id, input).await
    }

    /// Rotate the password after verifying the current one.
    #[instrument(skip(self, input))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> Result<(), AuthError> {
        if input.new_password != input.confirm_password {
            return Err(AuthError::Validation("password confirmation does not match".into()));
        }
        validate_password(&input.new_password).map_err(|e| AuthError::Validation(e.to_string()))?;

        let cred = self.repo.get_credentials(user_id).await?.ok_or(AuthError::NotFound)?;
        let parsed =
            PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.current_password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.new_password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();
        self.repo.set_password(user_id, hash, PASSWORD_ALGORITHM.to_string()).await?;
        info!(%user_id, "password_changed");
        Ok(())
    }

    fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours))
            .timestamp() as usize;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            exp,
        };
        encode(
            &JwtHeader::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

/// Decode and validate a bearer token. Expired or tampered tokens are
/// `Unauthorized`.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::Unauthorized)
}
