//! Terminal rendering of replays: colored per-action dispositions and
//! the final mark summary, via the `console` crate.

use console::Style;

use crate::attempt::{Attempt, Disposition};
use crate::scenario::{ReplayOutcome, ScenarioAction};

pub struct ReplayUi {
    green: Style,
    red: Style,
    yellow: Style,
    bold: Style,
}

impl ReplayUi {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            bold: Style::new().bold(),
        }
    }

    /// One line per scripted action: kept actions show the state they
    /// produced, discarded ones are flagged and change nothing.
    pub fn print_replay(&self, title: &str, actions: &[ScenarioAction], outcome: &ReplayOutcome) {
        if !title.is_empty() {
            println!("{}", self.bold.apply_to(format!("─── {title} ───")));
        }

        let mut steps = outcome.attempt.steps().iter();
        for (i, (action, disposition)) in
            actions.iter().zip(&outcome.dispositions).enumerate()
        {
            match disposition {
                Disposition::Kept => {
                    // Kept actions and steps line up one to one.
                    let state = steps
                        .next()
                        .map(|s| s.state.to_string())
                        .unwrap_or_default();
                    println!(
                        "  {} {:>2} {} → {state}",
                        self.green.apply_to("✓"),
                        i + 1,
                        label(action),
                    );
                }
                Disposition::Discarded => {
                    println!(
                        "  {} {:>2} {} (discarded)",
                        self.yellow.apply_to("↷"),
                        i + 1,
                        label(action),
                    );
                }
            }
        }

        println!();
        let state_style = if outcome.attempt.state().is_finished() {
            &self.green
        } else {
            &self.yellow
        };
        println!(
            "  {} {}",
            state_style.apply_to("state:"),
            outcome.state_string
        );
        match outcome.details.actual_mark {
            Some(actual) => {
                println!(
                    "  mark: {:.2} / {:.2} (raw {:.2}, penalty {:.2})",
                    actual,
                    outcome.details.max_mark,
                    outcome.details.raw_mark.unwrap_or(0.0),
                    outcome.details.total_penalty.unwrap_or(0.0),
                );
            }
            None => {
                println!("  {}", self.red.apply_to("mark: not yet graded"));
            }
        }
        if outcome.details.improvable {
            println!("  {}", self.yellow.apply_to("the mark can still improve"));
        }
    }

    /// The full attempt history as pretty JSON, the audit trail.
    pub fn print_audit(&self, attempt: &Attempt) {
        println!();
        println!("{}", self.bold.apply_to("─── Attempt history ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(attempt).unwrap_or_default()
        );
    }
}

impl Default for ReplayUi {
    fn default() -> Self {
        Self::new()
    }
}

fn label(action: &ScenarioAction) -> &'static str {
    match action {
        ScenarioAction::Save { .. } => "save",
        ScenarioAction::Submit { .. } => "submit",
        ScenarioAction::TryAgain => "try again",
        ScenarioAction::Finish => "finish",
        ScenarioAction::Comment { .. } => "comment",
    }
}
