pub mod exit;
mod traits;
mod types;

pub use exit::{classify_exit, classify_spawn_error, normalize_exit};
pub use traits::ShellRunner;
pub use types::{ShellFailure, ShellOutcome, SHELL_ACTION};
