pub mod auth;
pub mod keyring;

pub use auth::Authorizer;
