use automn_dsl::{tokenize_with_config, SpannedToken};

use crate::cli::{GlobalOpts, TokensArgs};
use crate::commands::read_source;
use crate::config::{load_config, resolve};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `tokens` command: dump the token stream of one file.
pub fn run(args: TokensArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let settings = resolve(&config, global);
    let source_text = read_source(&args.file)?;

    let tokens =
        tokenize_with_config(&source_text, settings.lexer).map_err(|error| CliError::Parse {
            error,
            source_text: source_text.clone(),
            file: args.file.clone(),
        })?;

    match output.mode {
        OutputMode::Json => {
            let list: Vec<serde_json::Value> = tokens.iter().map(token_json).collect();
            output.print_json(&serde_json::Value::Array(list));
        }
        OutputMode::Human | OutputMode::Plain => {
            for token in &tokens {
                println!("{}", token_line(token));
            }
        }
    }
    Ok(())
}

/// `line:column  start..end  KIND  text`, one token per line.
fn token_line(token: &SpannedToken) -> String {
    let position = format!("{}:{}", token.location.line, token.location.column);
    let span = format!("{}..{}", token.span.start, token.span.end);
    let mut line = format!("{position:<8} {span:<12} {:?}", token.token);
    if token.token.carries_text() {
        line.push_str(&format!(" {:?}", token.text));
    }
    line
}

fn token_json(token: &SpannedToken) -> serde_json::Value {
    serde_json::json!({
        "kind": format!("{:?}", token.token),
        "text": token.text,
        "line": token.location.line,
        "column": token.location.column,
        "span": { "start": token.span.start, "end": token.span.end },
    })
}
