//! Terminal output for the CLI.
//!
//! Everything goes to stderr; stdout stays free for piping.

use console::{Style, Term};
use quire_site::{Diagnostic, Diagnostics};

pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    red_bold: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            red_bold: Style::new().red().bold(),
            dim: Style::new().dim(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print every diagnostic of a failed build, then a count.
    pub(crate) fn diagnostics(&self, diagnostics: &Diagnostics) {
        for diagnostic in diagnostics {
            let _ = self.term.write_line(&self.format_diagnostic(diagnostic));
        }
        let _ = self.term.write_line(
            &self
                .dim
                .apply_to(format!(
                    "{} problem(s) found, nothing was written",
                    diagnostics.len()
                ))
                .to_string(),
        );
    }

    /// `error[kind]: path: message`, with the path dimmed.
    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let label = self
            .red_bold
            .apply_to(format!("error[{}]", diagnostic.kind));
        match &diagnostic.path {
            Some(path) => format!(
                "{label}: {} {}",
                self.dim.apply_to(format!("{}:", path.display())),
                diagnostic.message
            ),
            None => format!("{label}: {}", diagnostic.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quire_site::DiagnosticKind;

    use super::*;

    #[test]
    fn test_format_diagnostic_plain() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
        let output = Output::new();
        let with_path =
            Diagnostic::new(DiagnosticKind::Parse, "malformed front matter").with_path("docs/a.md");
        assert_eq!(
            output.format_diagnostic(&with_path),
            "error[parse]: docs/a.md: malformed front matter"
        );
        let without = Diagnostic::new(DiagnosticKind::VersionRegistry, "two last versions");
        assert_eq!(
            output.format_diagnostic(&without),
            "error[version-registry]: two last versions"
        );
    }
}
