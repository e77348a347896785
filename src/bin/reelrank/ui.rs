use std::io::IsTerminal;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::{Color, Style};

/// Console color scheme selected by `--theme`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

/// Decorated terminal output for the text format.
///
/// Colors are emitted only when stdout is a terminal and the theme
/// allows them; quiet mode strips decoration down to bare lines.
pub struct Ui {
    colors: Option<Colors>,
    quiet: bool,
}

impl Ui {
    pub fn new(theme: Theme, quiet: bool) -> Self {
        let want_color =
            !quiet && theme != Theme::Plain && std::io::stdout().is_terminal();
        let colors = want_color.then(|| match theme {
            Theme::Light => Colors::light(),
            _ => Colors::dark(),
        });

        #[cfg(windows)]
        if colors.is_some() {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self { colors, quiet }
    }

    pub fn spacer(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// Aligned label/value block under a heading.
    pub fn section<'a, I>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let rows: Vec<(&str, String)> = rows.into_iter().collect();
        let Some(width) = rows.iter().map(|(label, _)| label.len()).max() else {
            return;
        };
        self.heading(title);
        let labels = self.style(|c| c.label);
        for (label, value) in rows {
            println!("  {} {value}", labels.paint(format!("{label:>width$}:")));
        }
    }

    /// Bulleted entries under a heading.
    pub fn list<I>(&self, title: &str, entries: I)
    where
        I: IntoIterator<Item = String>,
    {
        let entries: Vec<String> = entries.into_iter().collect();
        if entries.is_empty() {
            return;
        }
        self.heading(title);
        let bullets = self.style(|c| c.note);
        for entry in entries {
            println!("  {} {entry}", bullets.paint("-"));
        }
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            println!("{message}");
        } else {
            println!("{} {message}", self.style(|c| c.note).paint(INFO_MARK));
        }
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            println!("{message}");
        } else {
            println!("{} {message}", self.style(|c| c.good).paint(DONE_MARK));
        }
    }

    pub fn warn(&self, message: &str) {
        if self.quiet {
            eprintln!("{message}");
        } else {
            eprintln!("{} {message}", self.style(|c| c.alert).paint(WARN_MARK));
        }
    }

    /// Spinner shown on stderr while a build phase runs.
    pub fn phase(&self, label: &str) -> Phase {
        let spinner = (!self.quiet).then(|| {
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("◐◓◑◒●");
            let spinner = ProgressBar::new_spinner().with_message(label.to_string());
            spinner.set_style(style);
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        });
        Phase {
            spinner,
            started: Instant::now(),
        }
    }

    fn heading(&self, title: &str) {
        if self.quiet {
            println!("{title}");
        } else {
            let line = format!("{HEADING_MARK} {title}");
            println!("{}", self.style(|c| c.heading).paint(line));
        }
    }

    /// The picked style when colors are on, an empty style otherwise.
    /// An empty style paints without escape codes.
    fn style(&self, pick: impl Fn(&Colors) -> Style) -> Style {
        self.colors.as_ref().map(pick).unwrap_or_default()
    }
}

/// Running spinner for one build phase. [`Phase::done`] stops it and
/// reports the elapsed time; dropping it clears the line so errors
/// never leave a half-drawn spinner behind.
pub struct Phase {
    spinner: Option<ProgressBar>,
    started: Instant,
}

impl Phase {
    pub fn done(mut self) -> Duration {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.started.elapsed()
    }
}

impl Drop for Phase {
    fn drop(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1_000 {
        format!("{millis}ms")
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

struct Colors {
    heading: Style,
    label: Style,
    note: Style,
    good: Style,
    alert: Style,
}

impl Colors {
    fn dark() -> Self {
        Self {
            heading: Color::LightMagenta.bold(),
            label: Color::Cyan.bold(),
            note: Color::LightBlue.normal(),
            good: Color::LightGreen.bold(),
            alert: Color::Yellow.bold(),
        }
    }

    fn light() -> Self {
        Self {
            heading: Color::Purple.bold(),
            label: Color::Blue.bold(),
            note: Color::DarkGray.normal(),
            good: Color::Green.bold(),
            alert: Color::Red.bold(),
        }
    }
}

const HEADING_MARK: &str = "»";
const INFO_MARK: &str = "·";
const DONE_MARK: &str = "✓";
const WARN_MARK: &str = "!";
