use super::{
    AuthToken, AuthTokenValue, FullUserStore, HistoryEntry, HistoryPage, HistoryQuery,
    NewHistoryEntry, PasswordCredentials, UserAuthCredentials, UserProfile,
};
use std::{sync::Arc, time::SystemTime};
use thiserror::Error;
use tracing::{debug, info};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum UserManagerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type UserResult<T> = Result<T, UserManagerError>;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_password(password: &str) -> UserResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserManagerError::InvalidInput(format!(
            "The password must be at least {} characters long.",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub struct UserManager {
    user_store: Arc<dyn FullUserStore>,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn FullUserStore>) -> Self {
        Self { user_store }
    }

    pub fn register(&self, email: &str, name: &str, password: &str) -> UserResult<usize> {
        let email = normalize_email(email);
        let name = name.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(UserManagerError::InvalidInput(
                "A valid email is required.".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(UserManagerError::InvalidInput(
                "The name cannot be empty.".to_string(),
            ));
        }
        validate_password(password)?;

        let user_id = self
            .user_store
            .create_user(&email, name)?
            .ok_or(UserManagerError::EmailTaken)?;
        let password = PasswordCredentials::new(user_id, password)?;
        self.user_store
            .update_user_auth_credentials(UserAuthCredentials {
                user_id,
                password: Some(password),
            })?;
        info!("Registered user {}", user_id);
        Ok(user_id)
    }

    /// Checks the password and opens a new session.
    pub fn login(&self, email: &str, password: &str) -> UserResult<(AuthToken, UserProfile)> {
        let email = normalize_email(email);
        let user_id = self
            .user_store
            .get_user_id(&email)?
            .ok_or(UserManagerError::InvalidCredentials)?;
        self.verify_password(user_id, password)?;

        let token = AuthToken {
            user_id,
            created: SystemTime::now(),
            last_used: None,
            value: AuthTokenValue::generate(),
        };
        self.user_store.add_user_auth_token(token.clone())?;
        self.user_store.update_user_last_login(user_id)?;
        self.user_store.update_password_last_used(user_id)?;

        let profile = self.get_profile(user_id)?;
        debug!("User {} logged in", user_id);
        Ok((token, profile))
    }

    fn verify_password(&self, user_id: usize, password: &str) -> UserResult<()> {
        let credentials = self
            .user_store
            .get_user_auth_credentials(user_id)?
            .and_then(|c| c.password)
            .ok_or(UserManagerError::InvalidCredentials)?;
        if !credentials.verify(password)? {
            return Err(UserManagerError::InvalidCredentials);
        }
        Ok(())
    }

    pub fn get_auth_token(&self, value: &AuthTokenValue) -> UserResult<Option<AuthToken>> {
        Ok(self.user_store.get_user_auth_token(value)?)
    }

    pub fn touch_auth_token(&self, value: &AuthTokenValue) -> UserResult<()> {
        Ok(self
            .user_store
            .update_user_auth_token_last_used_timestamp(value)?)
    }

    pub fn logout(&self, value: &AuthTokenValue) -> UserResult<()> {
        self.user_store
            .delete_user_auth_token(value)?
            .ok_or(UserManagerError::NotFound)?;
        Ok(())
    }

    /// Replaces the password and closes every other session of the user.
    pub fn change_password(
        &self,
        user_id: usize,
        current_password: &str,
        new_password: &str,
        current_token: &AuthTokenValue,
    ) -> UserResult<()> {
        self.verify_password(user_id, current_password)?;
        validate_password(new_password)?;

        let password = PasswordCredentials::new(user_id, new_password)?;
        self.user_store
            .update_user_auth_credentials(UserAuthCredentials {
                user_id,
                password: Some(password),
            })?;
        let revoked = self
            .user_store
            .delete_other_user_auth_tokens(user_id, current_token)?;
        info!(
            "User {} changed password, revoked {} other sessions",
            user_id, revoked
        );
        Ok(())
    }

    pub fn get_profile(&self, user_id: usize) -> UserResult<UserProfile> {
        self.user_store
            .get_user_profile(user_id)?
            .ok_or(UserManagerError::NotFound)
    }

    pub fn update_profile(
        &self,
        user_id: usize,
        name: Option<&str>,
        preferences: Option<&serde_json::Value>,
    ) -> UserResult<UserProfile> {
        let name = name.map(str::trim);
        if name.is_some_and(str::is_empty) {
            return Err(UserManagerError::InvalidInput(
                "The name cannot be empty.".to_string(),
            ));
        }
        if preferences.is_some_and(|p| !p.is_object()) {
            return Err(UserManagerError::InvalidInput(
                "Preferences must be a JSON object.".to_string(),
            ));
        }
        if !self
            .user_store
            .update_user_profile(user_id, name, preferences)?
        {
            return Err(UserManagerError::NotFound);
        }
        self.get_profile(user_id)
    }

    pub fn save_generation(
        &self,
        user_id: usize,
        entry: NewHistoryEntry,
    ) -> UserResult<HistoryEntry> {
        let entry_id = self.user_store.add_history_entry(user_id, entry)?;
        self.get_history_entry(user_id, entry_id)
    }

    pub fn list_history(&self, user_id: usize, query: HistoryQuery) -> UserResult<HistoryPage> {
        Ok(self
            .user_store
            .get_history(user_id, &query.normalized())?)
    }

    pub fn get_history_entry(&self, user_id: usize, entry_id: usize) -> UserResult<HistoryEntry> {
        self.user_store
            .get_history_entry(user_id, entry_id)?
            .ok_or(UserManagerError::NotFound)
    }

    /// Returns the stored WAV bytes and counts it as a play.
    pub fn play_history_audio(&self, user_id: usize, entry_id: usize) -> UserResult<Vec<u8>> {
        let audio = self
            .user_store
            .get_history_audio(user_id, entry_id)?
            .ok_or(UserManagerError::NotFound)?;
        self.user_store.record_history_play(user_id, entry_id)?;
        Ok(audio)
    }

    pub fn delete_history_entry(&self, user_id: usize, entry_id: usize) -> UserResult<()> {
        if !self.user_store.delete_history_entry(user_id, entry_id)? {
            return Err(UserManagerError::NotFound);
        }
        Ok(())
    }

    pub fn set_history_favorite(
        &self,
        user_id: usize,
        entry_id: usize,
        favorite: bool,
    ) -> UserResult<HistoryEntry> {
        if !self
            .user_store
            .set_history_favorite(user_id, entry_id, favorite)?
        {
            return Err(UserManagerError::NotFound);
        }
        self.get_history_entry(user_id, entry_id)
    }

    pub fn add_history_tags(
        &self,
        user_id: usize,
        entry_id: usize,
        tags: &[String],
    ) -> UserResult<Vec<String>> {
        self.user_store
            .add_history_tags(user_id, entry_id, tags)?
            .ok_or(UserManagerError::NotFound)
    }
}
