use std::io::Write;

use owo_colors::OwoColorize;
use resume_text_core::Outcome;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the single status line for a run.
pub fn print_outcome(
    w: &mut dyn Write,
    outcome: &Outcome,
    color: ColorMode,
) -> std::io::Result<()> {
    if !color.enabled() {
        return writeln!(w, "{}", outcome);
    }
    match outcome {
        Outcome::Written { destination, .. } => writeln!(
            w,
            "{} {}",
            "Wrote extracted text to:".green(),
            destination.display().bold()
        ),
        Outcome::Failed { message } => {
            writeln!(w, "{} {}", "Error extracting text:".red().bold(), message)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn render(outcome: &Outcome, color: ColorMode) -> String {
        let mut buf = Vec::new();
        print_outcome(&mut buf, outcome, color).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_lines_match_display() {
        let ok = Outcome::Written {
            destination: PathBuf::from("/site/assets/resume_text.txt"),
            bytes: 3,
        };
        assert_eq!(
            render(&ok, ColorMode(false)),
            "Wrote extracted text to: /site/assets/resume_text.txt\n"
        );

        let failed = Outcome::Failed {
            message: "boom".to_string(),
        };
        assert_eq!(
            render(&failed, ColorMode(false)),
            "Error extracting text: boom\n"
        );
    }

    #[test]
    fn colored_output_is_still_one_line() {
        let failed = Outcome::Failed {
            message: "boom".to_string(),
        };
        let line = render(&failed, ColorMode(true));
        assert!(line.contains("\u{1b}["));
        assert!(line.contains("boom"));
        assert_eq!(line.lines().count(), 1);
    }
}
