mod ops;
mod sandbox;

pub use ops::{EntryType, FileEntry, FileOpError, FileOps};
pub use sandbox::{Sandbox, SandboxError};
