pub mod app;
pub mod reports;
pub mod session;
