use super::auth::{AuthToken, AuthTokenValue, UserAuthCredentials};
use super::user_models::{HistoryEntry, HistoryPage, HistoryQuery, NewHistoryEntry, UserProfile};
use anyhow::Result;

pub trait UserAuthCredentialsStore: Send + Sync {
    /// Returns the user's authentication credentials given the user id.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user_auth_credentials(&self, user_id: usize) -> Result<Option<UserAuthCredentials>>;

    /// Replaces the user's authentication credentials.
    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()>;

    /// Records a successful password login.
    fn update_password_last_used(&self, user_id: usize) -> Result<()>;
}

pub trait UserAuthTokenStore: Send + Sync {
    /// Returns a user's authentication token given an AuthTokenValue.
    /// Returns Ok(None) if the token does not exist.
    /// Returns Err if there is a database error.
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes an auth token given the token value.
    /// Returns Ok(None) if the token does not exist.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Updates an auth token with the latest timestamp.
    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    /// Adds a new auth token.
    fn add_user_auth_token(&self, token: AuthToken) -> Result<()>;

    /// Returns all of a user's authentication tokens.
    fn get_all_user_auth_tokens(&self, user_id: usize) -> Result<Vec<AuthToken>>;

    /// Deletes every token of the user except `keep`, returns how many were deleted.
    fn delete_other_user_auth_tokens(&self, user_id: usize, keep: &AuthTokenValue)
        -> Result<usize>;
}

pub trait UserStore: UserAuthTokenStore + UserAuthCredentialsStore + Send + Sync {
    /// Creates a new user and returns the user id.
    /// Returns Ok(None) if the email is already registered.
    fn create_user(&self, email: &str, name: &str) -> Result<Option<usize>>;

    /// Returns the id of the user with the given email.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_id(&self, email: &str) -> Result<Option<usize>>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user_profile(&self, user_id: usize) -> Result<Option<UserProfile>>;

    /// Updates the fields that are Some, returns false if the user does not exist.
    fn update_user_profile(
        &self,
        user_id: usize,
        name: Option<&str>,
        preferences: Option<&serde_json::Value>,
    ) -> Result<bool>;

    fn update_user_last_login(&self, user_id: usize) -> Result<()>;
}

/// Per-user generation history. Every method is scoped to `user_id`:
/// entries belonging to somebody else behave as if they did not exist.
pub trait UserHistoryStore: Send + Sync {
    /// Stores a generated clip and returns the new entry id.
    fn add_history_entry(&self, user_id: usize, entry: NewHistoryEntry) -> Result<usize>;

    fn get_history(&self, user_id: usize, query: &HistoryQuery) -> Result<HistoryPage>;

    fn get_history_entry(&self, user_id: usize, entry_id: usize) -> Result<Option<HistoryEntry>>;

    fn get_history_audio(&self, user_id: usize, entry_id: usize) -> Result<Option<Vec<u8>>>;

    /// Returns false if nothing was deleted.
    fn delete_history_entry(&self, user_id: usize, entry_id: usize) -> Result<bool>;

    fn set_history_favorite(&self, user_id: usize, entry_id: usize, favorite: bool)
        -> Result<bool>;

    /// Bumps the play count and sets the last played time.
    fn record_history_play(&self, user_id: usize, entry_id: usize) -> Result<bool>;

    /// Merges `tags` into the entry's tags, returns the resulting list.
    fn add_history_tags(
        &self,
        user_id: usize,
        entry_id: usize,
        tags: &[String],
    ) -> Result<Option<Vec<String>>>;
}

pub trait FullUserStore: UserStore + UserHistoryStore {}

impl<T: UserStore + UserHistoryStore> FullUserStore for T {}
