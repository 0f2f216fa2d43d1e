mod firebase_auth_client;

pub use firebase_auth_client::FirebaseAuthClient;
