use std::path::PathBuf;

use automn_dsl::{parse_with_config, print, LexerConfig};

use crate::cli::{FmtArgs, GlobalOpts};
use crate::commands::{discover_schema_files, read_source};
use crate::config::{load_config, resolve};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `fmt` command: rewrite files in canonical form, or with
/// `--check` list the files that would change.
///
/// A file that fails to parse stops the run before anything else is written.
pub fn run(args: FmtArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let settings = resolve(&config, global);
    let paths = settings.paths_or_default(&args.paths);
    let files = discover_schema_files(&paths, &settings.extension)?;

    let mut rewrites: Vec<(PathBuf, String)> = Vec::new();
    for file in &files {
        let source_text = read_source(file)?;
        let formatted = format_source(&source_text, settings.lexer).map_err(|error| {
            CliError::Parse {
                error,
                source_text: source_text.clone(),
                file: file.clone(),
            }
        })?;
        if formatted != source_text {
            rewrites.push((file.clone(), formatted));
        }
    }
    let changed: Vec<&PathBuf> = rewrites.iter().map(|(file, _)| file).collect();

    if !args.check {
        for (file, formatted) in &rewrites {
            std::fs::write(file, formatted).map_err(|e| CliError::Io {
                path: file.clone(),
                source: e,
            })?;
            tracing::info!(file = %file.display(), "reformatted");
        }
    }

    let verb = if args.check { "would reformat" } else { "reformatted" };
    match output.mode {
        OutputMode::Human => {
            for file in &changed {
                output.status(&format!("  {verb} {}", output.path(&file.display().to_string())));
            }
            let outcome = if args.check { "need formatting" } else { "reformatted" };
            let summary = format!("{} of {} files {outcome}", changed.len(), files.len());
            if args.check && !changed.is_empty() {
                output.warn(&summary);
            } else {
                output.success(&summary);
            }
        }
        OutputMode::Json => {
            let list: Vec<String> = changed.iter().map(|f| f.display().to_string()).collect();
            output.print_json(&serde_json::json!({
                "files": files.len(),
                "check": args.check,
                "changed": list,
            }));
        }
        OutputMode::Plain => {
            for file in &changed {
                println!("{}", file.display());
            }
        }
    }

    if args.check && !changed.is_empty() {
        return Err(CliError::Unformatted {
            count: changed.len(),
        });
    }
    Ok(())
}

/// Canonical text of a source file.
pub fn format_source(source: &str, config: LexerConfig) -> Result<String, automn_dsl::DslError> {
    let tree = parse_with_config(source, config)?;
    Ok(print(&tree))
}
