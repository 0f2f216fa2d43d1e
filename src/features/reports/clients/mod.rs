mod firestore_client;
mod firestore_value;

pub use firestore_client::FirestoreClient;
