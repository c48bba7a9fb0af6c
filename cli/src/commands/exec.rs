use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use vox_core::api::{AppConfig, CliError, ExecutionResult, IntentParser, PolicyEngine};
use vox_plugins::build_services;

use crate::commands::cli::{join_text, ExecArgs, TextArgs};

/// Process exit code for one result: 0 ok, 2 blocked, 1 anything else.
pub fn exit_code(result: &ExecutionResult) -> i32 {
    if result.success {
        0
    } else if result.blocked {
        2
    } else {
        1
    }
}

pub async fn handle_exec(args: ExecArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let services = build_services(cfg, Vec::new()).await?;
    let result = services.executor.execute(&join_text(&args.text)).await;
    if args.json {
        let body = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::Command(e.to_string()))?;
        println!("{body}");
    } else if result.success {
        println!("{}", result.result_text);
    } else {
        eprintln!("{}", result.result_text);
    }
    Ok(exit_code(&result))
}

pub fn handle_check(args: TextArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let policy = PolicyEngine::from_config(&cfg.policy)?;
    let verdict = policy.check(&join_text(&args.text));
    let body =
        serde_json::to_string_pretty(&verdict).map_err(|e| CliError::Command(e.to_string()))?;
    println!("{body}");
    Ok(if verdict.safe { 0 } else { 2 })
}

pub fn handle_parse(args: TextArgs) -> Result<i32, CliError> {
    let intent = IntentParser::new().parse(&join_text(&args.text));
    let body =
        serde_json::to_string_pretty(&intent).map_err(|e| CliError::Command(e.to_string()))?;
    println!("{body}");
    Ok(0)
}

/// Line-oriented loop over stdin; `exit`/`quit` or EOF ends it.
pub async fn handle_repl(cfg: &AppConfig) -> Result<i32, CliError> {
    let services = build_services(cfg, Vec::new()).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"vox> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        let result = services.executor.execute(line).await;
        let marker = if result.success {
            ""
        } else if result.blocked {
            "[blocked] "
        } else {
            "[error] "
        };
        stdout
            .write_all(format!("{marker}{}\n", result.result_text).as_bytes())
            .await?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::api::ErrorKind;

    #[test]
    fn exit_codes_follow_outcome() {
        assert_eq!(exit_code(&ExecutionResult::ok("Shell Command", "x")), 0);
        assert_eq!(exit_code(&ExecutionResult::blocked("Shell Command", "no")), 2);
        assert_eq!(
            exit_code(&ExecutionResult::failed("Shell Command", "no", ErrorKind::CommandFailed)),
            1
        );
    }
}
