pub mod clients;
pub mod controllers;
pub mod models;
pub mod store;

pub use clients::FirestoreClient;
pub use store::ReportStore;
