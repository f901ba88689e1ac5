use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{
        MIN_PASSWORD_LEN, is_valid_email, is_valid_password, normalize_optional, require_text,
    },
    domain::entities::user::{User, UserRole},
};

const MAX_NAME_CHARS: usize = 255;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn get_by_id(&self, user_id: i64) -> AppResult<Option<User>>;
    /// Emails are stored lowercased; callers pass a normalized address.
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn update_profile(
        &self,
        user_id: i64,
        name: &str,
        bio: Option<&str>,
        avatar_url: Option<&str>,
    ) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> AppResult<String>;
    async fn verify(&self, password: &str, hash: &str) -> AppResult<bool>;
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub interests: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub interests: Option<String>,
}

/// Partial profile update. `None` keeps the current value, an empty string
/// clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// The caller's own account, never includes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub interests: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            interests: user.interests.clone(),
            avatar_url: user.avatar_url.clone(),
            bio: user.bio.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// What other users may see.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            bio: user.bio.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Clone)]
pub struct AuthUseCases {
    repo: Arc<dyn UserRepo>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthUseCases {
    pub fn new(repo: Arc<dyn UserRepo>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> AppResult<User> {
        let email = input.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }
        if !is_valid_password(&input.password) {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let name = require_text("Name", &input.name, MAX_NAME_CHARS).map_err(AppError::InvalidInput)?;

        if self.repo.get_by_email(&email).await?.is_some() {
            return Err(AppError::InvalidInput("User already exists".into()));
        }

        let password_hash = self.hasher.hash(&input.password).await?;
        let user = self
            .repo
            .create(NewUser {
                email,
                password_hash,
                name,
                phone: normalize_optional(input.phone.as_deref()),
                interests: normalize_optional(input.interests.as_deref()),
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.repo.get_by_email(&email).await? else {
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn me(&self, user_id: i64) -> AppResult<User> {
        self.repo
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn public_profile(&self, user_id: i64) -> AppResult<PublicProfile> {
        let user = self
            .repo
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(PublicProfile::from(&user))
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> AppResult<User> {
        let current = self.me(user_id).await?;

        let name = match update.name {
            Some(name) => require_text("Name", &name, MAX_NAME_CHARS).map_err(AppError::InvalidInput)?,
            None => current.name,
        };
        let bio = match update.bio {
            Some(bio) => normalize_optional(Some(&bio)),
            None => current.bio,
        };
        let avatar_url = match update.avatar_url {
            Some(url) => normalize_optional(Some(&url)),
            None => current.avatar_url,
        };

        self.repo
            .update_profile(user_id, &name, bio.as_deref(), avatar_url.as_deref())
            .await?
            .ok_or(AppError::NotFound)
    }
}
