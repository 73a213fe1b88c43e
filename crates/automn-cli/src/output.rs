use console::{Style, Term};

use crate::cli::GlobalOpts;
use crate::diagnostic::render_diagnostic;
use crate::error::CliError;

/// Output format mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    /// Unknown names fall back to `Human`; clap has already restricted the values.
    fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }
}

/// Output context derived from global flags.
///
/// Results go to stdout; status lines, warnings and errors go to stderr
/// so that `--print` and `--tree` output stays pipeable.
pub struct OutputContext {
    pub mode: OutputMode,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputContext {
    pub fn from_global(global: &GlobalOpts) -> Self {
        let use_color = !global.no_color
            && std::env::var("TERM").map_or(true, |t| t != "dumb")
            && Term::stderr().is_term();

        Self {
            mode: OutputMode::from_name(&global.format),
            quiet: global.quiet,
            use_color,
        }
    }

    /// `label message`, with the label styled when color is on.
    fn labelled(&self, label: &str, style: Style, msg: &str) -> String {
        if self.use_color {
            format!("{} {msg}", style.apply_to(label))
        } else {
            format!("{label} {msg}")
        }
    }

    fn human_visible(&self) -> bool {
        !self.quiet && self.mode == OutputMode::Human
    }

    /// Closing line of a successful run. Human mode only.
    pub fn success(&self, msg: &str) {
        if self.human_visible() {
            eprintln!("{}", self.labelled("ok", Style::new().green().bold(), msg));
        }
    }

    /// Closing line of a run that found problems. Human mode only; the
    /// machine-readable modes carry the same facts in their own output.
    pub fn warn(&self, msg: &str) {
        if self.human_visible() {
            eprintln!("{}", self.labelled("warning:", Style::new().yellow().bold(), msg));
        }
    }

    /// Per-file progress line. Human mode only.
    pub fn status(&self, msg: &str) {
        if self.human_visible() {
            eprintln!("{msg}");
        }
    }

    /// Reports the error that ended the run. Parse errors get a source
    /// snippet in human mode.
    pub fn print_error(&self, err: &CliError) {
        match (self.mode, err) {
            (
                OutputMode::Human,
                CliError::Parse {
                    error,
                    source_text,
                    file,
                },
            ) => {
                let report = render_diagnostic(error, source_text, &file.display().to_string());
                eprintln!("{report:?}");
            }
            (OutputMode::Human, _) => {
                eprintln!("{}", self.labelled("error:", Style::new().red().bold(), &err.to_string()));
            }
            (OutputMode::Json, _) => eprintln!("{}", err.to_json()),
            (OutputMode::Plain, _) => eprintln!("error\t{err}"),
        }
    }

    /// Pretty JSON to stdout.
    pub fn print_json(&self, value: &serde_json::Value) {
        if let Ok(s) = serde_json::to_string_pretty(value) {
            println!("{s}");
        }
    }

    /// Style a file path for status lines.
    pub fn path(&self, path: &str) -> String {
        if self.use_color {
            Style::new().cyan().apply_to(path).to_string()
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_global(format: &str, quiet: bool, no_color: bool) -> GlobalOpts {
        GlobalOpts {
            config: None,
            format: format.into(),
            verbose: 0,
            quiet,
            no_color,
            tab_width: None,
        }
    }

    fn plain_context(mode: OutputMode, quiet: bool) -> OutputContext {
        OutputContext {
            mode,
            quiet,
            use_color: false,
        }
    }

    #[test]
    fn mode_from_format_flag() {
        for (format, mode) in [
            ("human", OutputMode::Human),
            ("json", OutputMode::Json),
            ("plain", OutputMode::Plain),
        ] {
            let ctx = OutputContext::from_global(&make_global(format, false, false));
            assert_eq!(ctx.mode, mode);
        }
    }

    #[test]
    fn no_color_flag_disables_color() {
        let ctx = OutputContext::from_global(&make_global("human", false, true));
        assert!(!ctx.use_color);
    }

    #[test]
    fn quiet_hides_human_lines() {
        let ctx = OutputContext::from_global(&make_global("human", true, false));
        assert!(ctx.quiet);
        assert!(!ctx.human_visible());
        assert!(plain_context(OutputMode::Human, false).human_visible());
    }

    #[test]
    fn machine_modes_hide_human_lines() {
        assert!(!plain_context(OutputMode::Json, false).human_visible());
        assert!(!plain_context(OutputMode::Plain, false).human_visible());
    }

    #[test]
    fn labels_without_color() {
        let ctx = plain_context(OutputMode::Human, false);
        assert_eq!(
            ctx.labelled("warning:", Style::new().yellow(), "1 of 2 files need formatting"),
            "warning: 1 of 2 files need formatting"
        );
        assert_eq!(ctx.path("a/b.automn"), "a/b.automn");
    }
}
