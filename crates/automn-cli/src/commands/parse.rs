use automn_core::SourceFile;
use automn_dsl::{parse_with_config, print, to_sexp_pretty};

use crate::cli::{GlobalOpts, ParseArgs};
use crate::commands::{discover_schema_files, read_source};
use crate::config::{load_config, resolve};
use crate::diagnostic::render_diagnostic;
use crate::error::{dsl_error_json, CliError};
use crate::output::{OutputContext, OutputMode};

fn tree_json(tree: &SourceFile) -> Result<serde_json::Value, CliError> {
    serde_json::to_value(tree)
        .map_err(|e| CliError::Other(format!("failed to serialize tree: {e}")))
}

/// Run the `parse` command: parse schema files and render diagnostics.
pub fn run(args: ParseArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let settings = resolve(&config, global);
    let paths = settings.paths_or_default(&args.paths);
    let files = discover_schema_files(&paths, &settings.extension)?;

    let mut total_definitions = 0usize;
    let mut failed = 0usize;
    let mut file_results: Vec<serde_json::Value> = Vec::new();

    for file in &files {
        let source_text = read_source(file)?;
        let filename = file.display().to_string();
        tracing::info!(file = %filename, "parsing");

        match parse_with_config(&source_text, settings.lexer) {
            Ok(tree) => {
                let count = tree.definitions.len();
                total_definitions += count;

                if args.print {
                    print!("{}", print(&tree));
                } else if args.tree {
                    println!("{}", to_sexp_pretty(&tree));
                } else if args.json_ast && output.mode != OutputMode::Json {
                    output.print_json(&tree_json(&tree)?);
                }

                match output.mode {
                    OutputMode::Json => {
                        let mut result = serde_json::json!({
                            "file": filename,
                            "definitions": count,
                            "errors": [],
                        });
                        if args.json_ast {
                            result["ast"] = tree_json(&tree)?;
                        }
                        file_results.push(result);
                    }
                    _ => output.status(&format!(
                        "  {} .... {count} definitions",
                        output.path(&filename)
                    )),
                }
            }
            Err(error) => {
                failed += 1;
                tracing::debug!(file = %filename, %error, "parse failed");

                match output.mode {
                    OutputMode::Human => {
                        let report = render_diagnostic(&error, &source_text, &filename);
                        eprintln!("{report:?}");
                    }
                    OutputMode::Json => {
                        file_results.push(serde_json::json!({
                            "file": filename,
                            "definitions": 0,
                            "errors": [dsl_error_json(&error)],
                        }));
                    }
                    OutputMode::Plain => {
                        let location = error.location();
                        eprintln!(
                            "{filename}:{}:{}\terror\t{error}",
                            location.line, location.column
                        );
                    }
                }
            }
        }
    }

    // Summary
    match output.mode {
        OutputMode::Human => {
            let summary = format!(
                "{total_definitions} definitions parsed from {} files, {failed} errors",
                files.len()
            );
            if failed > 0 {
                output.warn(&summary);
            } else {
                output.success(&summary);
            }
        }
        OutputMode::Json => {
            let summary = serde_json::json!({
                "files": files.len(),
                "definitions": total_definitions,
                "errors": failed,
                "results": file_results,
            });
            output.print_json(&summary);
        }
        OutputMode::Plain => {
            if !args.print && !args.tree && !args.json_ast {
                println!("{}\t{total_definitions}\t{failed}", files.len());
            }
        }
    }

    if failed > 0 {
        Err(CliError::ParseFailures {
            failed,
            total: files.len(),
        })
    } else {
        Ok(())
    }
}
