use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::PolicyConfig;
use crate::error::CoreError;

/// Base commands a shell invocation may start with.
pub const DEFAULT_ALLOWED_COMMANDS: &[&str] = &[
    // files
    "ls", "pwd", "cat", "head", "tail", "wc", "touch", "mkdir", "cp", "mv", "find", "tree",
    "file", "stat", "du", "diff",
    // text
    "echo", "grep", "sort", "uniq", "cut", "nano", "vim", "vi",
    // system info
    "date", "cal", "whoami", "hostname", "uname", "uptime", "df", "free", "ps", "which",
    // network
    "ping", "curl", "dig", "nslookup",
    // dev tooling
    "git", "node", "npm", "python3", "cargo", "make",
];

/// Literal fragments that block a command wherever they appear (compared lower-cased).
pub const DEFAULT_DENY_FRAGMENTS: &[&str] = &[
    "rm -rf /",
    "rm -rf ~",
    "rm -rf *",
    "rm -fr /",
    "--no-preserve-root",
    "sudo ",
    "su root",
    "doas ",
    "mkfs",
    "dd if=",
    "of=/dev/",
    "> /dev/sd",
    ":(){",
    "killall",
    "pkill",
    "shutdown",
    "reboot",
    "poweroff",
    "halt",
    "init 0",
    "nmap",
    "masscan",
    "netcat",
    "nc -l",
    "/etc/shadow",
];

const DEFAULT_DENY_PATTERNS: &[(&str, &str)] = &[
    (
        "recursive delete rooted at /",
        r"(?i)\brm\s+(?:-[a-z]+\s+)*-[a-z]*r[a-z]*(?:\s+-[a-z]+)*\s+/(?:\s|\*|$)",
    ),
    (
        "chmod 777 rooted at /",
        r"(?i)\bchmod\s+(?:-[a-z]+\s+)*0?777\s+/",
    ),
    ("kill -9 <pid>", r"(?i)\bkill\s+-(?:9|kill)\s+\d+"),
    (
        "redirect into system credential file",
        r">\s*/etc/(?:passwd|shadow|sudoers|group)\b",
    ),
    ("backtick command substitution", r"`[^`]*`"),
    ("$() command substitution", r"\$\([^)]*\)"),
    (
        "download piped into a shell",
        r"(?i)\b(?:curl|wget)\b[^|]*\|\s*(?:sh|bash|zsh)\b",
    ),
];

/// Operators that let one allowed command smuggle another.
pub const CHAINING_OPERATORS: &[&str] = &["&&", "||", ";", "`", "$(", "<(", ">(", "\n", "\r"];

#[derive(Debug, Clone)]
pub struct DenyPattern {
    pub label: String,
    pub regex: Regex,
}

impl DenyPattern {
    pub fn new(label: impl Into<String>, pattern: &str) -> Result<Self, CoreError> {
        let regex = Regex::new(pattern).map_err(|source| CoreError::PolicyPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            label: label.into(),
            regex,
        })
    }
}

lazy_static! {
    static ref DEFAULT_PATTERNS: Vec<DenyPattern> = DEFAULT_DENY_PATTERNS
        .iter()
        .map(|(label, pattern)| DenyPattern {
            label: label.to_string(),
            regex: Regex::new(pattern).expect("built-in deny pattern"),
        })
        .collect();

    /// A lone `&` (background job) that is not part of `&&` or a `>&` redirect.
    pub(crate) static ref BACKGROUND_AMPERSAND: Regex =
        Regex::new(r"(?:^|[^&>])&(?:[^&>]|$)").expect("background pattern");
}

/// The data the policy engine evaluates against.
#[derive(Debug, Clone)]
pub struct PolicyRules {
    pub allowed: BTreeSet<String>,
    pub deny_fragments: Vec<String>,
    pub deny_patterns: Vec<DenyPattern>,
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            allowed: DEFAULT_ALLOWED_COMMANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            deny_fragments: DEFAULT_DENY_FRAGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            deny_patterns: DEFAULT_PATTERNS.clone(),
        }
    }
}

impl PolicyRules {
    /// Defaults plus whatever the config adds. Config can only widen the denylist
    /// and the allowlist, never remove built-in denials.
    pub fn from_config(cfg: &PolicyConfig) -> Result<Self, CoreError> {
        let mut rules = Self::default();
        rules
            .allowed
            .extend(cfg.extra_allow.iter().map(|s| s.trim().to_string()));
        rules.deny_fragments.extend(
            cfg.extra_deny_fragments
                .iter()
                .map(|s| s.to_lowercase()),
        );
        for pattern in &cfg.extra_deny_patterns {
            rules
                .deny_patterns
                .push(DenyPattern::new(format!("custom: {pattern}"), pattern)?);
        }
        Ok(rules)
    }

    /// First few allowed commands, alphabetically, for "try instead" hints.
    pub fn sample_allowed(&self, n: usize) -> Vec<String> {
        self.allowed.iter().take(n).cloned().collect()
    }
}
