//! Ordered pattern table consulted by the intent parser.
//!
//! Entries are tried top to bottom and the first match wins. Within a tier, a
//! pattern with a longer literal prefix must sit above any shorter pattern that
//! would also match its inputs (`remember that X is Y` before `remember X is Y`,
//! `copy file A to B` before `copy A to B`).

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::types::{FileFunction, MemoryFunction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternTarget {
    Memory(MemoryFunction),
    File(FileFunction),
    /// Natural-language phrase mapped onto a fixed shell command.
    ShellAlias(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Memory = 1,
    File = 2,
    Shell = 3,
}

pub type ArgExtractor = fn(&Captures<'_>) -> Vec<String>;

pub struct IntentPattern {
    pub name: &'static str,
    pub tier: Tier,
    pub regex: Regex,
    pub target: PatternTarget,
    pub extract: ArgExtractor,
}

impl std::fmt::Debug for IntentPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentPattern")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .field("regex", &self.regex.as_str())
            .field("target", &self.target)
            .finish()
    }
}

/// Every capture group, in order, cleaned up.
fn positional(caps: &Captures<'_>) -> Vec<String> {
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| clean_arg(m.as_str()))
        .collect()
}

fn key_with_true_flag(caps: &Captures<'_>) -> Vec<String> {
    let mut args = positional(caps);
    args.push("true".to_string());
    args
}

fn no_args(_: &Captures<'_>) -> Vec<String> {
    Vec::new()
}

pub(crate) fn clean_arg(raw: &str) -> String {
    let raw = raw.trim();
    // Sentence punctuation goes, but a bare `.` or `..` is a path.
    let stripped = raw.trim_end_matches(['?', '.', '!']).trim();
    let trimmed = if stripped.is_empty() { raw } else { stripped };
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

fn entry(
    name: &'static str,
    tier: Tier,
    pattern: &str,
    target: PatternTarget,
    extract: ArgExtractor,
) -> IntentPattern {
    IntentPattern {
        name,
        tier,
        regex: Regex::new(&format!("(?i)^{pattern}$")).expect("intent table pattern"),
        target,
        extract,
    }
}

fn build_table() -> Vec<IntentPattern> {
    use FileFunction as F;
    use MemoryFunction as M;
    use PatternTarget::{File, Memory, ShellAlias};

    vec![
        // Memory tier.
        entry(
            "remember_that_key_value",
            Tier::Memory,
            r"remember\s+that\s+(.+?)\s+is\s+(.+)",
            Memory(M::SaveMemory),
            positional,
        ),
        entry(
            "remember_key_value",
            Tier::Memory,
            r"remember\s+(.+?)\s+is\s+(.+)",
            Memory(M::SaveMemory),
            positional,
        ),
        entry(
            "remember_flag",
            Tier::Memory,
            r"remember\s+(.+)",
            Memory(M::SaveMemory),
            key_with_true_flag,
        ),
        entry(
            "recall_about",
            Tier::Memory,
            r"what\s+do\s+you\s+remember\s+about\s+(.+)",
            Memory(M::GetMemory),
            positional,
        ),
        entry(
            "show_all_memory",
            Tier::Memory,
            r"(?:what\s+do\s+you\s+remember|(?:show|list)\s+(?:all\s+)?(?:my\s+)?memor(?:y|ies))\??",
            Memory(M::GetAllMemory),
            no_args,
        ),
        entry(
            "recall",
            Tier::Memory,
            r"recall\s+(.+)",
            Memory(M::GetMemory),
            positional,
        ),
        entry(
            "clear_memory",
            Tier::Memory,
            r"(?:forget\s+everything|clear\s+(?:all\s+)?(?:my\s+)?memor(?:y|ies))",
            Memory(M::ClearMemory),
            no_args,
        ),
        entry(
            "search_memory",
            Tier::Memory,
            r"search\s+(?:my\s+)?memor(?:y|ies)\s+for\s+(.+)",
            Memory(M::SearchMemory),
            positional,
        ),
        entry(
            "memory_stats",
            Tier::Memory,
            r"(?:show\s+)?memory\s+stat(?:s|istics)",
            Memory(M::GetMemoryStats),
            no_args,
        ),
        entry(
            "command_history",
            Tier::Memory,
            r"(?:show\s+)?(?:my\s+)?(?:command\s+)?history(?:\s+(\d+))?",
            Memory(M::GetCommandHistory),
            positional,
        ),
        // File tier.
        entry(
            "create_a_file",
            Tier::File,
            r"create\s+a\s+(?:new\s+)?file\s+(?:called\s+|named\s+)?(.+)",
            File(F::CreateFile),
            positional,
        ),
        entry(
            "create_file",
            Tier::File,
            r"create\s+(?:new\s+)?file\s+(?:called\s+|named\s+)?(.+)",
            File(F::CreateFile),
            positional,
        ),
        entry(
            "create_a_directory",
            Tier::File,
            r"(?:create|make)\s+a\s+(?:new\s+)?(?:folder|directory)\s+(?:called\s+|named\s+)?(.+)",
            File(F::CreateDirectory),
            positional,
        ),
        entry(
            "create_directory",
            Tier::File,
            r"(?:create|make)\s+(?:new\s+)?(?:folder|directory)\s+(?:called\s+|named\s+)?(.+)",
            File(F::CreateDirectory),
            positional,
        ),
        entry(
            "delete_file",
            Tier::File,
            r"(?:delete|remove)\s+(?:the\s+)?file\s+(.+)",
            File(F::DeleteFile),
            positional,
        ),
        entry(
            "copy_file",
            Tier::File,
            r"copy\s+(?:the\s+)?file\s+(.+?)\s+to\s+(.+)",
            File(F::CopyFile),
            positional,
        ),
        entry(
            "copy",
            Tier::File,
            r"copy\s+(.+?)\s+to\s+(.+)",
            File(F::CopyFile),
            positional,
        ),
        entry(
            "move_file",
            Tier::File,
            r"move\s+(?:the\s+)?file\s+(.+?)\s+to\s+(.+)",
            File(F::MoveFile),
            positional,
        ),
        entry(
            "move",
            Tier::File,
            r"move\s+(.+?)\s+to\s+(.+)",
            File(F::MoveFile),
            positional,
        ),
        entry(
            "rename",
            Tier::File,
            r"rename\s+(?:the\s+)?(?:file\s+)?(.+?)\s+to\s+(.+)",
            File(F::MoveFile),
            positional,
        ),
        entry(
            "list_files_in",
            Tier::File,
            r"(?:list|show)\s+(?:all\s+)?(?:the\s+)?files\s+in\s+(.+)",
            File(F::ListFiles),
            positional,
        ),
        entry(
            "list_files",
            Tier::File,
            r"(?:list|show)\s+(?:all\s+)?(?:the\s+)?files",
            File(F::ListFiles),
            no_args,
        ),
        // Shell aliases.
        entry(
            "where_am_i",
            Tier::Shell,
            r"where\s+am\s+i\??",
            ShellAlias("pwd"),
            no_args,
        ),
        entry(
            "what_time",
            Tier::Shell,
            r"what\s+time\s+is\s+it\??",
            ShellAlias("date"),
            no_args,
        ),
        entry(
            "what_date",
            Tier::Shell,
            r"(?:what(?:'s|\s+is)\s+(?:the\s+)?date(?:\s+today)?|what\s+day\s+is\s+it)\??",
            ShellAlias("date"),
            no_args,
        ),
        entry(
            "who_am_i",
            Tier::Shell,
            r"who\s+am\s+i\??",
            ShellAlias("whoami"),
            no_args,
        ),
        entry(
            "disk_usage",
            Tier::Shell,
            r"(?:show|check)\s+disk\s+(?:usage|space)",
            ShellAlias("df -h"),
            no_args,
        ),
        entry(
            "processes",
            Tier::Shell,
            r"(?:show|list)\s+(?:running\s+)?processes",
            ShellAlias("ps aux"),
            no_args,
        ),
    ]
}

lazy_static! {
    pub static ref INTENT_PATTERNS: Vec<IntentPattern> = build_table();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_ordered_by_tier() {
        let tiers: Vec<Tier> = INTENT_PATTERNS.iter().map(|p| p.tier).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        assert_eq!(tiers, sorted);
    }

    #[test]
    fn pattern_names_are_unique() {
        let mut names: Vec<&str> = INTENT_PATTERNS.iter().map(|p| p.name).collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn clean_arg_strips_quotes_and_punctuation() {
        assert_eq!(clean_arg(" \"my notes.txt\" "), "my notes.txt");
        assert_eq!(clean_arg("'a b'"), "a b");
        assert_eq!(clean_arg("project deadline?"), "project deadline");
        assert_eq!(clean_arg("\""), "\"");
        assert_eq!(clean_arg(" .. "), "..");
    }
}
