pub mod identity_provider;
pub mod like_service;
pub mod registration_service;

pub use identity_provider::{FirebaseAuth, IdentityProvider, ServiceAccount, IDENTITY_TOOLKIT_API_BASE};
