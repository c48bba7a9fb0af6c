use std::path::{Component, Path};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `>`, `>>`, `2>`, `<`, `&>` and `>&` prefixes glued to their target.
    static ref REDIRECT_PREFIX: Regex =
        Regex::new(r"^(?:\d*|&)(?:>>|>|<)&?").expect("redirect prefix pattern");
    static ref VARIABLE: Regex =
        Regex::new(r"\$(?:[A-Za-z_{]|\d)").expect("variable pattern");
}

/// Absolute targets that never touch user data.
const HARMLESS_ABSOLUTE: &[&str] = &["/dev/null", "/dev/stdout", "/dev/stderr"];

/// Why a shell argument would reach outside the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathEscape {
    Absolute(String),
    Home(String),
    Parent(String),
    Variable(String),
}

impl PathEscape {
    pub(crate) fn token(&self) -> &str {
        match self {
            PathEscape::Absolute(t)
            | PathEscape::Home(t)
            | PathEscape::Parent(t)
            | PathEscape::Variable(t) => t,
        }
    }

    pub(crate) fn reason(&self) -> String {
        match self {
            PathEscape::Absolute(t) => format!("absolute path '{t}' is outside the workspace"),
            PathEscape::Home(t) => format!("home-relative path '{t}' is outside the workspace"),
            PathEscape::Parent(t) => format!("path '{t}' climbs above the workspace"),
            PathEscape::Variable(t) => {
                format!("variable expansion in '{t}' may point outside the workspace")
            }
        }
    }
}

/// First argument or redirect target of `command` that leaves the working directory.
///
/// The check is lexical: relative paths are resolved against the directory the
/// command runs in, and any `..` that climbs above it is an escape.
pub(crate) fn find_escape(command: &str) -> Option<PathEscape> {
    command
        .split(|c: char| c.is_whitespace() || c == '|')
        .filter(|t| !t.is_empty())
        .find_map(classify)
}

fn classify(raw: &str) -> Option<PathEscape> {
    let unquoted = raw.trim_matches(|c| c == '"' || c == '\'');
    let target = REDIRECT_PREFIX.replace(unquoted, "");
    // `--output=../x`, `of=/x`
    let target = match target.split_once('=') {
        Some((_, value)) => value,
        None => target.as_ref(),
    };
    if target.is_empty() || target.contains("://") {
        return None;
    }

    if VARIABLE.is_match(target) {
        return Some(PathEscape::Variable(raw.to_string()));
    }
    if target.starts_with('~') {
        return Some(PathEscape::Home(raw.to_string()));
    }
    if target.starts_with('/') {
        if HARMLESS_ABSOLUTE.contains(&target) {
            return None;
        }
        return Some(PathEscape::Absolute(raw.to_string()));
    }
    if climbs_above_start(target) {
        return Some(PathEscape::Parent(raw.to_string()));
    }
    None
}

fn climbs_above_start(path: &str) -> bool {
    let mut depth: i32 = 0;
    for component in Path::new(path).components() {
        match component {
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            Component::Normal(_) => depth += 1,
            _ => {}
        }
    }
    false
}
