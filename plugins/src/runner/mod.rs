mod process;

pub use process::ProcessShellRunner;
