//! Action dispatch for one question attempt.
//!
//! [`ActionProcessor`] receives incoming actions, consults the tries
//! store and the question collaborator, and either commits a new step to
//! the attempt history (`Kept`) or rejects the action (`Discarded`).
//! Discards are expected control flow; only configuration and store
//! failures are errors, and a failed store write aborts the action
//! before any step is committed.

use crate::attempt::{
    Action, ActionKind, Attempt, AttemptState, Disposition, RetryPolicy, Step, VAR_COMMENT,
    VAR_RAW_FRACTION, VAR_SUBMIT, VAR_TRIES_LEFT,
};
use crate::config::QuestionConfig;
use crate::error::EngineError;
use crate::penalty::adjusted_fraction;
use crate::question::{Question, Response};
use crate::store::TriesStore;

pub struct ActionProcessor<'a, S: TriesStore, Q: Question + ?Sized> {
    question: &'a Q,
    config: &'a QuestionConfig,
    store: &'a mut S,
}

impl<'a, S: TriesStore, Q: Question + ?Sized> ActionProcessor<'a, S, Q> {
    pub fn new(question: &'a Q, config: &'a QuestionConfig, store: &'a mut S) -> Self {
        Self {
            question,
            config,
            store,
        }
    }

    /// The retry policy for this question, selected from the question
    /// capability. The two policies are mutually exclusive.
    pub fn policy(&self) -> RetryPolicy {
        if self.question.supports_inline_retries() {
            RetryPolicy::Inline
        } else {
            RetryPolicy::Gated
        }
    }

    /// Start a fresh attempt on this question under the selected policy.
    pub fn new_attempt(&self, question_id: impl Into<String>) -> Attempt {
        Attempt::new(question_id, self.policy())
    }

    /// Remaining tries as recorded in the store, defaulting to the
    /// configured total when no record exists yet. Clamped to the total
    /// so a stale larger counter can never reduce the penalty.
    fn remaining(&self, attempt: &Attempt) -> Result<u32, EngineError> {
        let stored = self.store.remaining(&attempt.id, &attempt.question_id)?;
        Ok(stored.unwrap_or(self.config.total_tries).min(self.config.total_tries))
    }

    /// Process one action against the attempt.
    pub fn process(
        &mut self,
        attempt: &mut Attempt,
        action: &Action,
    ) -> Result<Disposition, EngineError> {
        // Finish ends the question from any non-finished state, gated or
        // not.
        if let Action::Finish = action {
            return self.process_finish(attempt);
        }

        let remaining = self.remaining(attempt)?;
        if attempt.is_gated(remaining) {
            if let Action::TryAgain = action {
                return Ok(self.process_try_again(attempt));
            }
            return Ok(Disposition::Discarded);
        }

        match action {
            Action::Comment { text, mark } => Ok(self.process_comment(attempt, text, *mark)),
            Action::Submit { response } => self.process_submit(attempt, response, remaining),
            Action::Save { response } => self.process_save(attempt, response, remaining),
            // Try-again is only meaningful in the gated sub-state.
            Action::TryAgain | Action::Finish => Ok(Disposition::Discarded),
        }
    }

    fn process_try_again(&self, attempt: &mut Attempt) -> Disposition {
        let mut step = Step::new(ActionKind::TryAgain, AttemptState::ToDo);
        step.set_var("tryagain", 1);
        attempt.push(step);
        Disposition::Kept
    }

    fn process_submit(
        &mut self,
        attempt: &mut Attempt,
        response: &Response,
        remaining: u32,
    ) -> Result<Disposition, EngineError> {
        if attempt.state().is_finished() {
            return Ok(Disposition::Discarded);
        }

        if !self.question.is_complete_response(response) {
            let mut step = Step::new(ActionKind::Submit, AttemptState::Invalid)
                .with_response(response.clone());
            step.set_var(VAR_SUBMIT, 1);
            attempt.push(step);
            return Ok(Disposition::Kept);
        }

        let (raw, graded_state) = self.question.grade_response(response);
        let mut step = if graded_state == AttemptState::GradedRight || remaining <= 1 {
            // Terminal grading: the answer is right, or this was the
            // last try.
            let fraction = adjusted_fraction(
                raw,
                self.config.total_tries,
                remaining,
                self.config.penalty_per_try,
            );
            let mut step = Step::new(ActionKind::Submit, graded_state);
            step.fraction = Some(fraction);
            step.set_var(VAR_TRIES_LEFT, remaining);
            step
        } else {
            // Wrong answer with tries left: consume a try. The write
            // must succeed before the step is committed.
            self.store
                .set_remaining(&attempt.id, &attempt.question_id, remaining - 1)?;
            let mut step = Step::new(ActionKind::Submit, AttemptState::ToDo);
            step.set_var(VAR_TRIES_LEFT, remaining - 1);
            step
        };
        step.set_var(VAR_SUBMIT, 1);
        step.set_var(VAR_RAW_FRACTION, raw);
        step.response = response.clone();
        step.response_summary = Some(self.question.summarise_response(response));
        attempt.push(step);
        Ok(Disposition::Kept)
    }

    fn process_finish(&mut self, attempt: &mut Attempt) -> Result<Disposition, EngineError> {
        if attempt.state().is_finished() {
            return Ok(Disposition::Discarded);
        }

        let response = attempt.last_response();
        let mut step = if !self.question.is_gradable_response(&response) {
            Step::new(ActionKind::Finish, AttemptState::GaveUp)
        } else {
            let remaining = self.remaining(attempt)?;
            let (raw, graded_state) = self.question.grade_response(&response);
            let fraction = adjusted_fraction(
                raw,
                self.config.total_tries,
                remaining,
                self.config.penalty_per_try,
            );
            let mut step = Step::new(ActionKind::Finish, graded_state);
            step.fraction = Some(fraction);
            step.set_var(VAR_TRIES_LEFT, remaining);
            step.set_var(VAR_RAW_FRACTION, raw);
            step
        };
        step.set_var("finish", 1);
        step.response_summary = Some(self.question.summarise_response(&response));
        attempt.push(step);
        Ok(Disposition::Kept)
    }

    fn process_save(
        &mut self,
        attempt: &mut Attempt,
        response: &Response,
        remaining: u32,
    ) -> Result<Disposition, EngineError> {
        if attempt.state().is_finished() {
            return Ok(Disposition::Discarded);
        }

        // Inline policy: moving on without ever having been graded is a
        // wrong answer, never an un-penalized free pass.
        if self.policy() == RetryPolicy::Inline && !attempt.has_been_graded() {
            return self.process_next_without_answer(attempt, response, remaining);
        }

        // Re-saving an unchanged response does nothing.
        if *response == attempt.last_response() {
            return Ok(Disposition::Discarded);
        }

        // Inline after grading re-asserts the committed state/fraction;
        // otherwise a plain save leaves the question editable.
        let (state, fraction) = if self.policy() == RetryPolicy::Inline {
            let last = attempt.last_step().map(|s| (s.state, s.fraction));
            last.unwrap_or((AttemptState::ToDo, None))
        } else {
            (AttemptState::ToDo, None)
        };
        let mut step = Step::new(ActionKind::Save, state).with_response(response.clone());
        step.fraction = fraction;
        attempt.push(step);
        Ok(Disposition::Kept)
    }

    /// The inline "skipped without an answer" path: grade as wrong with
    /// fraction zero so the try machinery stays honest.
    fn process_next_without_answer(
        &mut self,
        attempt: &mut Attempt,
        response: &Response,
        remaining: u32,
    ) -> Result<Disposition, EngineError> {
        let fraction = adjusted_fraction(
            0.0,
            self.config.total_tries,
            remaining,
            self.config.penalty_per_try,
        );
        let mut step =
            Step::new(ActionKind::Save, AttemptState::GradedWrong).with_response(response.clone());
        step.fraction = Some(fraction);
        step.set_var(VAR_TRIES_LEFT, remaining);
        step.set_var(VAR_RAW_FRACTION, 0.0);
        step.response_summary = Some(self.question.summarise_response(response));
        attempt.push(step);
        Ok(Disposition::Kept)
    }

    fn process_comment(&self, attempt: &mut Attempt, text: &str, mark: Option<f64>) -> Disposition {
        let mut step = Step::new(ActionKind::Comment, attempt.state());
        if let Some(mark) = mark
            && self.config.max_mark > 0.0
        {
            // The grader-supplied mark is authoritative; no penalty
            // machinery applies.
            let fraction = mark / self.config.max_mark;
            step.state = self.question.state_for_fraction(fraction).commented();
            step.fraction = Some(fraction);
        }
        step.set_var(VAR_COMMENT, text);
        attempt.push(step);
        Disposition::Kept
    }

    /// Presentation string for the attempt's current standing:
    /// "N tries remaining" while answerable, "Not yet complete" in the
    /// gated sub-state, the state description otherwise.
    pub fn state_string(
        &self,
        attempt: &Attempt,
        show_correctness: bool,
    ) -> Result<String, EngineError> {
        let state = attempt.state();
        if !state.is_active() || state == AttemptState::Invalid {
            return Ok(state.describe(show_correctness).to_string());
        }
        let remaining = self.remaining(attempt)?;
        if attempt.is_gated(remaining) {
            Ok("Not yet complete".to_string())
        } else if remaining == 1 {
            Ok("1 try remaining".to_string())
        } else {
            Ok(format!("{remaining} tries remaining"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::question::{ExactMatchQuestion, KeywordQuestion};
    use crate::store::MemoryTriesStore;

    fn config(total_tries: u32, penalty: f64, max_mark: f64) -> QuestionConfig {
        QuestionConfig {
            total_tries,
            penalty_per_try: penalty,
            max_mark,
        }
    }

    fn answer(text: &str) -> Action {
        Action::Submit {
            response: Response::from_pairs([("answer", text)]),
        }
    }

    fn save(text: &str) -> Action {
        Action::Save {
            response: Response::from_pairs([("answer", text)]),
        }
    }

    #[test]
    fn correct_first_try_finishes_without_consuming_a_try() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        let d = processor.process(&mut attempt, &answer("42")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedRight);

        let step = attempt.last_step().unwrap();
        assert_eq!(step.fraction, Some(1.0));
        assert_eq!(step.tries_left(), Some(3));
        assert_eq!(step.raw_fraction(), Some(1.0));
        assert_eq!(step.response_summary.as_deref(), Some("42"));

        // No try was consumed: the store never saw a write.
        assert_eq!(store.remaining(&attempt.id, "q1").unwrap(), None);
    }

    #[test]
    fn wrong_submit_with_tries_left_decrements_and_stays_open() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        let d = processor.process(&mut attempt, &answer("41")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::ToDo);
        assert!(!attempt.state().is_finished());

        let step = attempt.last_step().unwrap();
        assert_eq!(step.fraction, None);
        assert_eq!(step.tries_left(), Some(2));
        assert_eq!(step.raw_fraction(), Some(0.0));
        assert_eq!(store.remaining(&attempt.id, "q1").unwrap(), Some(2));
    }

    #[test]
    fn wrong_submit_on_last_try_finishes_with_full_penalty() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");
        store.set_remaining(&attempt.id, "q1", 1).unwrap();

        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let d = processor.process(&mut attempt, &answer("41")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedWrong);
        assert_eq!(attempt.last_step().unwrap().fraction, Some(0.0));
        assert_eq!(attempt.last_step().unwrap().tries_left(), Some(1));
    }

    #[test]
    fn worked_example_three_tries() {
        // totalTries=3, penalty=0.1: two wrong tries then a correct one
        // earns an adjusted fraction of 0.8.
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &answer("40")).unwrap();
        processor
            .process(&mut attempt, &Action::TryAgain)
            .unwrap();
        processor.process(&mut attempt, &answer("41")).unwrap();
        processor
            .process(&mut attempt, &Action::TryAgain)
            .unwrap();
        assert_eq!(attempt.steps()[2].tries_left(), Some(1));

        processor.process(&mut attempt, &answer("42")).unwrap();
        assert_eq!(attempt.state(), AttemptState::GradedRight);
        let step = attempt.last_step().unwrap();
        assert!((step.fraction.unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(step.raw_fraction(), Some(1.0));
        assert_eq!(step.tries_left(), Some(1));
    }

    #[test]
    fn incomplete_submit_is_invalid_and_costs_nothing() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        let d = processor.process(&mut attempt, &answer("   ")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::Invalid);
        assert_eq!(attempt.last_step().unwrap().fraction, None);
        assert_eq!(store.remaining(&attempt.id, "q1").unwrap(), None);

        // The invalid state is not gated: a corrected submit goes
        // straight through.
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let d = processor.process(&mut attempt, &answer("42")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedRight);
        assert_eq!(attempt.last_step().unwrap().fraction, Some(1.0));
    }

    #[test]
    fn actions_after_finish_are_discarded() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &answer("42")).unwrap();
        let steps_before = attempt.steps().len();

        for action in [
            answer("41"),
            save("41"),
            Action::TryAgain,
            Action::Finish,
        ] {
            let d = processor.process(&mut attempt, &action).unwrap();
            assert_eq!(d, Disposition::Discarded, "{action:?}");
        }
        assert_eq!(attempt.steps().len(), steps_before);
        assert_eq!(attempt.last_step().unwrap().fraction, Some(1.0));
    }

    #[test]
    fn gated_substate_accepts_only_try_again() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &answer("41")).unwrap();
        let steps_before = attempt.steps().len();

        // Everything except try-again bounces off the gate.
        for action in [
            answer("42"),
            save("42"),
            Action::Comment {
                text: "nice try".into(),
                mark: Some(5.0),
            },
        ] {
            let d = processor.process(&mut attempt, &action).unwrap();
            assert_eq!(d, Disposition::Discarded, "{action:?}");
        }
        assert_eq!(attempt.steps().len(), steps_before);

        // Try-again re-opens the question without touching mark or tries.
        let d = processor.process(&mut attempt, &Action::TryAgain).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::ToDo);
        assert_eq!(attempt.last_step().unwrap().fraction, None);
        assert_eq!(store.remaining(&attempt.id, "q1").unwrap(), Some(2));

        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let d = processor.process(&mut attempt, &answer("42")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedRight);
    }

    #[test]
    fn finish_works_while_gated() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &answer("41")).unwrap();
        let d = processor.process(&mut attempt, &Action::Finish).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedWrong);
        // One try consumed before the finish: raw 0 stays 0 after the
        // penalty clamp.
        assert_eq!(attempt.last_step().unwrap().fraction, Some(0.0));
    }

    #[test]
    fn inline_policy_allows_immediate_resubmit() {
        let question = ExactMatchQuestion {
            answer: "42".into(),
            inline_retries: true,
        };
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        assert_eq!(processor.policy(), RetryPolicy::Inline);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &answer("41")).unwrap();
        assert_eq!(attempt.state(), AttemptState::ToDo);

        // No re-open action exists; try-again is meaningless inline.
        let d = processor.process(&mut attempt, &Action::TryAgain).unwrap();
        assert_eq!(d, Disposition::Discarded);

        let d = processor.process(&mut attempt, &answer("42")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedRight);
        assert!((attempt.last_step().unwrap().fraction.unwrap() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn inline_save_before_any_grading_is_a_penalized_skip() {
        let question = ExactMatchQuestion {
            answer: "42".into(),
            inline_retries: true,
        };
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        let d = processor.process(&mut attempt, &save("")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedWrong);
        let step = attempt.last_step().unwrap();
        assert_eq!(step.fraction, Some(0.0));
        assert_eq!(step.raw_fraction(), Some(0.0));
        assert_eq!(step.tries_left(), Some(3));
    }

    #[test]
    fn inline_save_after_grading_does_not_move_the_score() {
        let question = ExactMatchQuestion {
            answer: "42".into(),
            inline_retries: true,
        };
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &answer("41")).unwrap();
        let d = processor.process(&mut attempt, &save("draft 41b")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::ToDo);
        assert_eq!(attempt.last_step().unwrap().fraction, None);
        assert_eq!(store.remaining(&attempt.id, "q1").unwrap(), Some(2));
    }

    #[test]
    fn duplicate_save_is_discarded() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        let d = processor.process(&mut attempt, &save("41")).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::ToDo);

        let d = processor.process(&mut attempt, &save("41")).unwrap();
        assert_eq!(d, Disposition::Discarded);
        assert_eq!(attempt.steps().len(), 1);
    }

    #[test]
    fn finish_without_gradable_response_gives_up() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        let d = processor.process(&mut attempt, &Action::Finish).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GaveUp);
        assert_eq!(attempt.last_step().unwrap().fraction, None);
    }

    #[test]
    fn finish_grades_the_last_saved_response() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &save("42")).unwrap();
        let d = processor.process(&mut attempt, &Action::Finish).unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedRight);
        // Never submitted, so no try was consumed and no penalty applies.
        assert_eq!(attempt.last_step().unwrap().fraction, Some(1.0));
    }

    #[test]
    fn partial_grade_counts_as_wrong_until_the_last_try() {
        let question = KeywordQuestion {
            keywords: vec!["ownership".into(), "borrowing".into()],
            inline_retries: true,
        };
        let config = config(2, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        // Half credit on the first of two tries: not terminal.
        processor
            .process(&mut attempt, &answer("ownership only"))
            .unwrap();
        assert_eq!(attempt.state(), AttemptState::ToDo);
        assert_eq!(attempt.last_step().unwrap().raw_fraction(), Some(0.5));

        // Half credit on the last try: terminal, penalty applied.
        processor
            .process(&mut attempt, &answer("still just ownership"))
            .unwrap();
        assert_eq!(attempt.state(), AttemptState::GradedPartial);
        assert!((attempt.last_step().unwrap().fraction.unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn comment_overrides_state_and_fraction_after_finish() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &answer("41")).unwrap();
        processor.process(&mut attempt, &Action::Finish).unwrap();
        assert_eq!(attempt.state(), AttemptState::GradedWrong);

        let d = processor
            .process(
                &mut attempt,
                &Action::Comment {
                    text: "method was right, arithmetic slip".into(),
                    mark: Some(5.0),
                },
            )
            .unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::CommentedPartial);
        assert_eq!(attempt.last_step().unwrap().fraction, Some(0.5));
        assert_eq!(
            attempt.last_step().unwrap().var(VAR_COMMENT),
            Some("method was right, arithmetic slip")
        );

        // The override is terminal: no further grading allowed.
        let d = processor.process(&mut attempt, &answer("42")).unwrap();
        assert_eq!(d, Disposition::Discarded);
    }

    #[test]
    fn comment_without_mark_preserves_the_state() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        processor.process(&mut attempt, &answer("42")).unwrap();
        let d = processor
            .process(
                &mut attempt,
                &Action::Comment {
                    text: "well done".into(),
                    mark: None,
                },
            )
            .unwrap();
        assert!(d.is_kept());
        assert_eq!(attempt.state(), AttemptState::GradedRight);
        assert_eq!(attempt.last_step().unwrap().fraction, None);
    }

    /// Store whose writes always fail, for the abort-on-write-failure
    /// contract.
    struct BrokenStore;

    impl TriesStore for BrokenStore {
        fn remaining(&self, _: &str, _: &str) -> Result<Option<u32>, StoreError> {
            Ok(None)
        }

        fn set_remaining(&mut self, _: &str, _: &str, _: u32) -> Result<(), StoreError> {
            Err(StoreError::Write("disk full".into()))
        }
    }

    #[test]
    fn store_write_failure_aborts_without_committing_a_step() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = BrokenStore;
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        let result = processor.process(&mut attempt, &answer("41"));
        assert!(matches!(result, Err(EngineError::Store(_))));
        assert!(attempt.steps().is_empty());
        assert_eq!(attempt.state(), AttemptState::NotStarted);
    }

    #[test]
    fn state_string_reports_tries_and_gate() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        let mut attempt = processor.new_attempt("q1");

        // NotStarted is not active: the state description is used.
        assert_eq!(
            processor.state_string(&attempt, true).unwrap(),
            "Not yet answered"
        );

        processor.process(&mut attempt, &save("4")).unwrap();
        assert_eq!(
            processor.state_string(&attempt, true).unwrap(),
            "3 tries remaining"
        );

        processor.process(&mut attempt, &answer("41")).unwrap();
        assert_eq!(
            processor.state_string(&attempt, true).unwrap(),
            "Not yet complete"
        );

        processor.process(&mut attempt, &Action::TryAgain).unwrap();
        processor.process(&mut attempt, &answer("40")).unwrap();
        processor.process(&mut attempt, &Action::TryAgain).unwrap();
        assert_eq!(
            processor.state_string(&attempt, true).unwrap(),
            "1 try remaining"
        );

        processor.process(&mut attempt, &answer("42")).unwrap();
        assert_eq!(processor.state_string(&attempt, true).unwrap(), "Correct");
        assert_eq!(
            processor.state_string(&attempt, false).unwrap(),
            "Answer saved"
        );
    }

    #[test]
    fn stale_oversized_counter_is_clamped_to_the_total() {
        let question = ExactMatchQuestion::new("42");
        let config = config(3, 0.1, 10.0);
        let mut store = MemoryTriesStore::new();
        let mut attempt = Attempt::new("q1", RetryPolicy::Gated);
        store.set_remaining(&attempt.id, "q1", 99).unwrap();

        let mut processor = ActionProcessor::new(&question, &config, &mut store);
        processor.process(&mut attempt, &answer("42")).unwrap();
        // Clamped to the total: graded as a first try, no penalty.
        assert_eq!(attempt.last_step().unwrap().fraction, Some(1.0));
        assert_eq!(attempt.last_step().unwrap().tries_left(), Some(3));
    }
}
