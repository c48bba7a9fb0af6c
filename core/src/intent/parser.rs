use serde_json::Value;

use super::patterns::{IntentPattern, PatternTarget, INTENT_PATTERNS};
use super::types::ParsedIntent;

/// Stateless classifier from free text to [`ParsedIntent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentParser;

impl IntentParser {
    pub fn new() -> Self {
        Self
    }

    /// The ordered table the parser walks, exposed for inspection.
    pub fn patterns(&self) -> &'static [IntentPattern] {
        INTENT_PATTERNS.as_slice()
    }

    /// Classifies `input`. Text that matches no memory or file pattern becomes a
    /// shell command verbatim (trimmed).
    pub fn parse(&self, input: &str) -> ParsedIntent {
        let text = input.trim();
        if text.is_empty() {
            return ParsedIntent::ParseError {
                reason: "Command text is empty".to_string(),
            };
        }

        for pattern in self.patterns() {
            let Some(caps) = pattern.regex.captures(text) else {
                continue;
            };
            tracing::debug!(target: "vox.intent", pattern = pattern.name, "intent pattern matched");
            let args = (pattern.extract)(&caps);
            return match pattern.target {
                PatternTarget::Memory(function) => ParsedIntent::MemoryOp { function, args },
                PatternTarget::File(function) => ParsedIntent::FileOp { function, args },
                PatternTarget::ShellAlias(command) => ParsedIntent::Shell {
                    command: command.to_string(),
                },
            };
        }

        ParsedIntent::Shell {
            command: text.to_string(),
        }
    }

    /// Classifies a raw transport value; anything but a JSON string is a parse error.
    pub fn parse_value(&self, raw: &Value) -> ParsedIntent {
        match raw {
            Value::String(s) => self.parse(s),
            Value::Null => ParsedIntent::ParseError {
                reason: "Command is missing".to_string(),
            },
            other => ParsedIntent::ParseError {
                reason: format!("Command must be a string, got {}", json_type_name(other)),
            },
        }
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{FileFunction, MemoryFunction};
    use pretty_assertions::assert_eq;

    fn file_op(function: FileFunction, args: &[&str]) -> ParsedIntent {
        ParsedIntent::FileOp {
            function,
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn memory_op(function: MemoryFunction, args: &[&str]) -> ParsedIntent {
        ParsedIntent::MemoryOp {
            function,
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn shell(command: &str) -> ParsedIntent {
        ParsedIntent::Shell {
            command: command.to_string(),
        }
    }

    #[test]
    fn create_file_phrasings() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("create file test_allowed.txt"),
            file_op(FileFunction::CreateFile, &["test_allowed.txt"])
        );
        assert_eq!(
            p.parse("create a file notes.md"),
            file_op(FileFunction::CreateFile, &["notes.md"])
        );
        assert_eq!(
            p.parse("Create a new file called \"my notes.txt\""),
            file_op(FileFunction::CreateFile, &["my notes.txt"])
        );
    }

    #[test]
    fn create_directory_phrasings() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("create a folder reports"),
            file_op(FileFunction::CreateDirectory, &["reports"])
        );
        assert_eq!(
            p.parse("make directory build/out"),
            file_op(FileFunction::CreateDirectory, &["build/out"])
        );
    }

    #[test]
    fn copy_and_move_bind_source_and_destination() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("copy file a.txt to b.txt"),
            file_op(FileFunction::CopyFile, &["a.txt", "b.txt"])
        );
        assert_eq!(
            p.parse("copy a.txt to backup/a.txt"),
            file_op(FileFunction::CopyFile, &["a.txt", "backup/a.txt"])
        );
        assert_eq!(
            p.parse("move file a.txt to archive/"),
            file_op(FileFunction::MoveFile, &["a.txt", "archive/"])
        );
        assert_eq!(
            p.parse("rename draft.txt to final.txt"),
            file_op(FileFunction::MoveFile, &["draft.txt", "final.txt"])
        );
    }

    #[test]
    fn delete_and_list() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("delete file old.log"),
            file_op(FileFunction::DeleteFile, &["old.log"])
        );
        assert_eq!(
            p.parse("remove the file old.log"),
            file_op(FileFunction::DeleteFile, &["old.log"])
        );
        assert_eq!(p.parse("list files"), file_op(FileFunction::ListFiles, &[]));
        assert_eq!(
            p.parse("show files in docs"),
            file_op(FileFunction::ListFiles, &["docs"])
        );
    }

    #[test]
    fn remember_binds_key_and_value() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("remember test key is test value"),
            memory_op(MemoryFunction::SaveMemory, &["test key", "test value"])
        );
        assert_eq!(
            p.parse("remember that my dog is Rex"),
            memory_op(MemoryFunction::SaveMemory, &["my dog", "Rex"])
        );
        assert_eq!(
            p.parse("remember dark mode"),
            memory_op(MemoryFunction::SaveMemory, &["dark mode", "true"])
        );
    }

    #[test]
    fn memory_queries() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("recall test key"),
            memory_op(MemoryFunction::GetMemory, &["test key"])
        );
        assert_eq!(
            p.parse("what do you remember about my dog?"),
            memory_op(MemoryFunction::GetMemory, &["my dog"])
        );
        assert_eq!(
            p.parse("what do you remember"),
            memory_op(MemoryFunction::GetAllMemory, &[])
        );
        assert_eq!(
            p.parse("forget everything"),
            memory_op(MemoryFunction::ClearMemory, &[])
        );
        assert_eq!(
            p.parse("search memory for dog"),
            memory_op(MemoryFunction::SearchMemory, &["dog"])
        );
        assert_eq!(
            p.parse("memory stats"),
            memory_op(MemoryFunction::GetMemoryStats, &[])
        );
        assert_eq!(
            p.parse("show command history 5"),
            memory_op(MemoryFunction::GetCommandHistory, &["5"])
        );
        assert_eq!(
            p.parse("history"),
            memory_op(MemoryFunction::GetCommandHistory, &[])
        );
    }

    #[test]
    fn memory_tier_wins_over_file_tier() {
        let p = IntentParser::new();
        assert_eq!(
            p.parse("remember copy a to b is done"),
            memory_op(MemoryFunction::SaveMemory, &["copy a to b", "done"])
        );
    }

    #[test]
    fn unmatched_text_falls_through_to_shell() {
        let p = IntentParser::new();
        assert_eq!(p.parse("  rm -rf /  "), shell("rm -rf /"));
        assert_eq!(
            p.parse("nonexistent_command_12345"),
            shell("nonexistent_command_12345")
        );
        assert_eq!(p.parse("ls -la"), shell("ls -la"));
        assert_eq!(p.parse("where am I?"), shell("pwd"));
        assert_eq!(p.parse("what time is it"), shell("date"));
    }

    #[test]
    fn parsing_is_idempotent() {
        let p = IntentParser::new();
        for input in ["copy file a to b", "remember x is y", "echo hi", "list files"] {
            assert_eq!(p.parse(input), p.parse(input));
        }
    }

    #[test]
    fn non_string_values_are_parse_errors() {
        let p = IntentParser::new();
        assert!(matches!(
            p.parse_value(&Value::Null),
            ParsedIntent::ParseError { .. }
        ));
        assert!(matches!(
            p.parse_value(&serde_json::json!(42)),
            ParsedIntent::ParseError { reason } if reason.contains("number")
        ));
        assert_eq!(
            p.parse_value(&serde_json::json!("list files")),
            file_op(FileFunction::ListFiles, &[])
        );
    }
}
