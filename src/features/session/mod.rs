pub mod clients;
pub mod controllers;
pub mod models;
pub mod provider;

pub use clients::FirebaseAuthClient;
pub use controllers::{SessionChange, SessionState};
pub use provider::IdentityProvider;
