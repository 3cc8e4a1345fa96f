pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod store;

pub use auth::CredentialManager;
pub use chat::ConversationCoordinator;
pub use config::AppConfig;
pub use error::{ChatError, StoreError};

/**
 * \brief SDK prelude for the commonly used modules.
 */
pub mod prelude {
    pub use crate::auth;
    pub use crate::chat;
    pub use crate::config;
    pub use crate::logger;
    pub use crate::models;
    pub use crate::store;
}
