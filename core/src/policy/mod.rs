mod engine;
mod paths;
mod rules;

pub use engine::{PolicyEngine, PolicyStage, PolicyVerdict};
pub use rules::{
    DenyPattern, PolicyRules, CHAINING_OPERATORS, DEFAULT_ALLOWED_COMMANDS,
    DEFAULT_DENY_FRAGMENTS,
};
