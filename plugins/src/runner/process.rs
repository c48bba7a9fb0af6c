use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use vox_core::api::{
    classify_exit, classify_spawn_error, normalize_exit, ErrorKind, ShellConfig, ShellOutcome,
    ShellRunner,
};

const READ_CHUNK: usize = 8 * 1024;

/// Runs approved commands through `<program> -c` with the cwd pinned to the sandbox root.
pub struct ProcessShellRunner {
    program: String,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ProcessShellRunner {
    pub fn new(cfg: &ShellConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            timeout: Duration::from_millis(cfg.timeout_ms.max(1)),
            max_output_bytes: cfg.max_output_bytes,
        }
    }
}

#[async_trait]
impl ShellRunner for ProcessShellRunner {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(&self, command: &str, cwd: &Path) -> ShellOutcome {
        let started = Instant::now();
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // The shell leads a fresh group so a timeout can take its pipeline down with it.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(target: "vox.shell", program = %self.program, error = %e, "spawn failed");
                return ShellOutcome::failure(classify_spawn_error(&e), e.to_string());
            }
        };

        let mut group = GroupKill::new(child.id());
        let out_task = child.stdout.take().map(|s| pump(s, self.max_output_bytes));
        let err_task = child.stderr.take().map(|s| pump(s, self.max_output_bytes));

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                group.disarm();
                status
            }
            Ok(Err(e)) => {
                group.kill();
                let _ = child.kill().await;
                return ShellOutcome::failure(ErrorKind::CommandFailed, e.to_string());
            }
            Err(_) => {
                group.kill();
                let _ = child.kill().await;
                tracing::warn!(
                    target: "vox.shell",
                    command = %command,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "command timed out, killed"
                );
                let mut outcome = ShellOutcome::failure(
                    ErrorKind::CommandTimeout,
                    format!("no result after {}s", self.timeout.as_secs_f32()),
                );
                outcome.duration_ms = started.elapsed().as_millis() as u64;
                return outcome;
            }
        };

        let stdout = collect(out_task).await;
        let stderr = collect(err_task).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        let code = normalize_exit(status);

        tracing::debug!(
            target: "vox.shell",
            exit_code = code,
            duration_ms,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "command exited"
        );

        if code == 0 {
            return ShellOutcome::success(stdout, stderr, duration_ms);
        }
        let kind = classify_exit(code, &stderr);
        let mut outcome = ShellOutcome::failure(kind, format!("exit status {code}"));
        outcome.exit_code = Some(code);
        outcome.stdout = stdout;
        outcome.stderr = stderr;
        outcome.duration_ms = duration_ms;
        outcome
    }
}

/// Sends SIGKILL to the child's process group when told to or when dropped.
///
/// Dropping covers a caller that abandons `run` mid-flight. After the shell
/// exits normally the guard is disarmed, since its group id may be reused.
#[cfg_attr(not(unix), allow(dead_code))]
struct GroupKill {
    pgid: Option<u32>,
}

impl GroupKill {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }

    fn kill(&mut self) {
        #[cfg(unix)]
        if let Some(pgid) = self.pgid.take() {
            // SAFETY: killpg only sends a signal; a group that is already gone yields ESRCH.
            let rc = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
            if rc != 0 {
                tracing::debug!(
                    target: "vox.shell",
                    pgid,
                    error = %std::io::Error::last_os_error(),
                    "killpg failed"
                );
            }
        }
        self.pgid = None;
    }
}

impl Drop for GroupKill {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Reads a pipe to EOF, keeping at most `cap` bytes. The rest is drained so the
/// child never blocks on a full pipe.
fn pump<R>(mut reader: R, cap: usize) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut kept = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK];
        let mut truncated = false;
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let room = cap.saturating_sub(kept.len());
                    if n > room {
                        truncated = true;
                    }
                    kept.extend_from_slice(&chunk[..n.min(room)]);
                }
            }
        }
        let mut text = String::from_utf8_lossy(&kept).into_owned();
        if truncated {
            text.push_str("\n[output truncated]");
        }
        text
    })
}

async fn collect(task: Option<JoinHandle<String>>) -> String {
    match task {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}
