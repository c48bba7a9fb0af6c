mod parser;
mod patterns;
mod types;

pub use parser::IntentParser;
pub use patterns::{IntentPattern, PatternTarget, Tier};
pub use types::{FileFunction, IntentKind, MemoryFunction, ParsedIntent};
