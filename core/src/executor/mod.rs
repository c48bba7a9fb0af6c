mod executor;
mod hooks;
mod types;

pub use executor::{CommandExecutor, CommandExecutorBuilder, SYSTEM_ACTION, VALIDATION_ACTION};
pub use hooks::ExecutionObserver;
pub use types::{ExecutionEvent, ExecutionResult};
