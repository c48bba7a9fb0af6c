use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_workdir")]
    pub workdir: String,

    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,
}

fn default_workdir() -> String {
    "~/.vox/workspace".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workdir: default_workdir(),
            shell: ShellConfig::default(),
            policy: PolicyConfig::default(),
            memory: MemoryConfig::default(),
            audit: AuditConfig::default(),
            logging: LoggingConfig::default(),
            http_server: HttpServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_shell_program")]
    pub program: String,

    #[serde(default = "default_shell_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

fn default_shell_program() -> String {
    "sh".to_string()
}

fn default_shell_timeout_ms() -> u64 {
    10_000
}

fn default_max_output_bytes() -> usize {
    1024 * 1024
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: default_shell_program(),
            timeout_ms: default_shell_timeout_ms(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

/// Additions layered on top of the built-in allow/deny tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub extra_allow: Vec<String>,

    #[serde(default)]
    pub extra_deny_fragments: Vec<String>,

    #[serde(default)]
    pub extra_deny_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    #[serde(default = "default_memory_path")]
    pub path: String,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_memory_enabled() -> bool {
    true
}

fn default_memory_path() -> String {
    "~/.vox/memory.json".to_string()
}

fn default_history_limit() -> usize {
    100
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            path: default_memory_path(),
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// File path, or `stdout:` to write audit lines to standard output.
    #[serde(default = "default_audit_path")]
    pub path: String,

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default)]
    pub drop_when_full: bool,
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_path() -> String {
    "~/.vox/audit.jsonl".to_string()
}

fn default_channel_capacity() -> usize {
    1024
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: default_audit_path(),
            channel_capacity: default_channel_capacity(),
            drop_when_full: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
