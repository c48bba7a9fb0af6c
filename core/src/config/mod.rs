mod load;
mod types;

pub use load::{expand_path, load_default, load_from, CONFIG_FILE};
pub use types::*;
