//! Replayable attempt scenarios loaded from TOML.
//!
//! A scenario bundles one question definition, its grading
//! configuration, and an ordered action list. Replaying it through the
//! engine must produce the same dispositions and marks as the live
//! attempt did, which is what makes the step history an audit log.

use serde::Deserialize;

use crate::attempt::{Action, Attempt, Disposition};
use crate::config::QuestionConfig;
use crate::error::EngineError;
use crate::processor::ActionProcessor;
use crate::question::{ExactMatchQuestion, KeywordQuestion, Question, Response};
use crate::report::{MarkDetails, mark_details};
use crate::store::TriesStore;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub title: String,
    pub question: ScenarioQuestion,
    #[serde(default, rename = "action")]
    pub actions: Vec<ScenarioAction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioQuestion {
    #[serde(default = "default_question_id")]
    pub id: String,
    #[serde(flatten)]
    pub spec: QuestionSpec,
    #[serde(flatten)]
    pub config: QuestionConfig,
}

fn default_question_id() -> String {
    "q1".to_string()
}

/// The question implementations a scenario can instantiate.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionSpec {
    ExactMatch {
        answer: String,
        #[serde(default)]
        inline_retries: bool,
    },
    Keywords {
        keywords: Vec<String>,
        #[serde(default)]
        inline_retries: bool,
    },
}

impl QuestionSpec {
    pub fn build(&self) -> Box<dyn Question> {
        match self {
            QuestionSpec::ExactMatch {
                answer,
                inline_retries,
            } => Box::new(ExactMatchQuestion {
                answer: answer.clone(),
                inline_retries: *inline_retries,
            }),
            QuestionSpec::Keywords {
                keywords,
                inline_retries,
            } => Box::new(KeywordQuestion {
                keywords: keywords.clone(),
                inline_retries: *inline_retries,
            }),
        }
    }
}

/// One scripted action; `answer` populates the response's `answer`
/// field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioAction {
    Save {
        #[serde(default)]
        answer: String,
    },
    Submit {
        #[serde(default)]
        answer: String,
    },
    TryAgain,
    Finish,
    Comment {
        text: String,
        #[serde(default)]
        mark: Option<f64>,
    },
}

impl ScenarioAction {
    pub fn to_action(&self) -> Action {
        match self {
            ScenarioAction::Save { answer } => Action::Save {
                response: Response::from_pairs([("answer", answer.as_str())]),
            },
            ScenarioAction::Submit { answer } => Action::Submit {
                response: Response::from_pairs([("answer", answer.as_str())]),
            },
            ScenarioAction::TryAgain => Action::TryAgain,
            ScenarioAction::Finish => Action::Finish,
            ScenarioAction::Comment { text, mark } => Action::Comment {
                text: text.clone(),
                mark: *mark,
            },
        }
    }
}

/// Everything a replay produces, ready for rendering.
#[derive(Debug)]
pub struct ReplayOutcome {
    pub attempt: Attempt,
    pub dispositions: Vec<Disposition>,
    pub details: MarkDetails,
    pub state_string: String,
}

impl Scenario {
    pub fn parse(contents: &str) -> Result<Self, EngineError> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario.question.config.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Drive the scripted actions through a fresh attempt.
    pub fn run<S: TriesStore>(&self, store: &mut S) -> Result<ReplayOutcome, EngineError> {
        let question = self.question.spec.build();
        let mut processor = ActionProcessor::new(question.as_ref(), &self.question.config, store);
        let mut attempt = processor.new_attempt(self.question.id.clone());

        let mut dispositions = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            dispositions.push(processor.process(&mut attempt, &action.to_action())?);
        }

        let state_string = processor.state_string(&attempt, true)?;
        let details = mark_details(question.as_ref(), &self.question.config, &attempt);
        Ok(ReplayOutcome {
            attempt,
            dispositions,
            details,
            state_string,
        })
    }
}
