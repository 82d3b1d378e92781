// Gateway module - controls public API for the core services

mod authenticator;
mod credentials;
mod favorites;
mod store_call;

pub use authenticator::{Identity, RequestAuthenticator};
pub use credentials::{CredentialStore, BCRYPT_COST};
pub use favorites::FavoritesManager;
pub use store_call::StoreCall;
