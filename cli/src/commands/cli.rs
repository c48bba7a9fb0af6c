use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Voice/text command console")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (defaults to ./vox.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the sandbox working directory.
    #[arg(long, global = true)]
    pub workdir: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExecArgs {
    /// Command text; multiple words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub text: Vec<String>,

    /// Print the full result as JSON instead of the result text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TextArgs {
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct HttpServerArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Session id reported by /health; generated when omitted.
    #[arg(long)]
    pub session_id: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Execute one command and print the result.
    Exec(ExecArgs),
    /// Show the policy verdict for a shell command without running it.
    Check(TextArgs),
    /// Show how text is classified without running it.
    Parse(TextArgs),
    /// Serve the HTTP API.
    Serve(HttpServerArgs),
    /// Read commands line by line from stdin (the default).
    Repl,
}

pub fn join_text(words: &[String]) -> String {
    words.join(" ")
}
