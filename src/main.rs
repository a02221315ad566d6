use anyhow::Result;
use clap::Parser;

use retrymark::cli::{Cli, Command};
use retrymark::config::QuizBank;
use retrymark::scenario::Scenario;
use retrymark::store::{JsonTriesStore, MemoryTriesStore};
use retrymark::ui::ReplayUi;

/// The worked example: three tries, 0.1 penalty per try, mark out of 10.
const DEMO_SCENARIO: &str = r#"
title = "Three tries, penalty 0.1, mark out of 10"

[question]
id = "demo-q1"
kind = "exact_match"
answer = "42"
total_tries = 3
penalty_per_try = 0.1
max_mark = 10.0

[[action]]
kind = "submit"
answer = "40"

[[action]]
kind = "try_again"

[[action]]
kind = "submit"
answer = "41"

[[action]]
kind = "try_again"

[[action]]
kind = "submit"
answer = "42"
"#;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ui = ReplayUi::new();

    match cli.command {
        Command::Replay {
            file,
            store,
            bank,
            quiz,
        } => {
            let mut scenario = Scenario::load(&file)?;
            if let (Some(bank_path), Some(quiz_id)) = (bank, quiz) {
                let bank = QuizBank::load(bank_path)?;
                scenario.question.config = bank
                    .question_config(&quiz_id, &scenario.question.id)?
                    .clone();
            }
            run_scenario(&ui, &scenario, store.as_deref(), cli.json)?;
        }
        Command::Demo => {
            let scenario = Scenario::parse(DEMO_SCENARIO)?;
            run_scenario(&ui, &scenario, None, cli.json)?;
        }
    }

    Ok(())
}

fn run_scenario(
    ui: &ReplayUi,
    scenario: &Scenario,
    store_path: Option<&str>,
    json: bool,
) -> Result<()> {
    let outcome = match store_path {
        Some(path) => {
            let mut store = JsonTriesStore::open(path)?;
            scenario.run(&mut store)?
        }
        None => {
            let mut store = MemoryTriesStore::new();
            scenario.run(&mut store)?
        }
    };

    ui.print_replay(&scenario.title, &scenario.actions, &outcome);
    if json {
        ui.print_audit(&outcome.attempt);
    }
    Ok(())
}
