use crate::error::ErrorKind;

/// Exit code with signals folded in the way shells report them (128 + signal).
pub fn normalize_exit(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(code) = status.code() {
            code
        } else if let Some(sig) = status.signal() {
            128 + sig
        } else {
            1
        }
    }
    #[cfg(windows)]
    {
        status.code().unwrap_or(1)
    }
}

/// Maps a non-zero exit from `sh -c` onto the error taxonomy.
///
/// POSIX shells exit 127 when the command cannot be found and 126 when it is
/// found but cannot be executed.
pub fn classify_exit(code: i32, stderr: &str) -> ErrorKind {
    let lowered = stderr.to_lowercase();
    match code {
        127 => ErrorKind::CommandNotFound,
        126 => ErrorKind::PermissionDenied,
        _ if lowered.contains("command not found") => ErrorKind::CommandNotFound,
        _ if lowered.contains("permission denied") => ErrorKind::PermissionDenied,
        _ => ErrorKind::CommandFailed,
    }
}

/// Maps a failure to spawn the shell itself.
pub fn classify_spawn_error(err: &std::io::Error) -> ErrorKind {
    match err.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::CommandNotFound,
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
        _ => ErrorKind::CommandFailed,
    }
}
