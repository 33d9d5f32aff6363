pub mod auth;
mod sqlite_user_store;
mod user_manager;
pub mod user_models;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue, PasswordCredentials, UserAuthCredentials};
pub use sqlite_user_store::SqliteUserStore;
pub use user_manager::{UserManager, UserManagerError, UserResult, MIN_PASSWORD_LENGTH};
pub use user_models::{
    HistoryEntry, HistoryPage, HistoryQuery, HistorySort, NewHistoryEntry, UserProfile,
    DEFAULT_HISTORY_PAGE_SIZE, MAX_HISTORY_PAGE_SIZE,
};
pub use user_store::{
    FullUserStore, UserAuthCredentialsStore, UserAuthTokenStore, UserHistoryStore, UserStore,
};
