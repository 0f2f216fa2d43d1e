mod app_shell;

pub use app_shell::{AppShell, AppShellHandle};
