//! Retry-with-penalty grading engine for a single question inside a
//! timed assessment attempt.
//!
//! Each wrong submission consumes one of a configured number of tries
//! and deducts a cumulative penalty from the eventual mark, until the
//! learner answers correctly, exhausts tries, or gives up. The engine
//! keeps an append-only step history per attempt, so replaying the
//! recorded actions produces exactly the marks of the live run.
//!
//! The core pieces:
//!
//! - [`processor::ActionProcessor`] dispatches submit / save / finish /
//!   try-again / comment actions, keeping or discarding each one.
//! - [`penalty::adjusted_fraction`] is the pure penalty rule.
//! - [`store::TriesStore`] is the persistence boundary for remaining
//!   tries; [`question::Question`] is the grading collaborator boundary.
//! - [`report::mark_details`] derives presentation-ready mark snapshots
//!   from the committed history.

pub mod attempt;
pub mod cli;
pub mod config;
pub mod error;
pub mod penalty;
pub mod processor;
pub mod question;
pub mod report;
pub mod scenario;
pub mod store;
pub mod ui;
