//! # Pure-past temporal specifications in Rust
//!
//! Translation steps:
//! * Pure-past LTL over declared input and output propositions
//! * Negation normal form
//! * One auxiliary state variable per distinct one-step-past subformula
//! * Symbolic automaton with init, transition and objective predicates

#![deny(clippy::all)]
#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]

pub(crate) mod automaton;
pub(crate) mod logic;
pub(crate) mod monitor;

pub use automaton::{encode, Automaton};
pub use logic::{Expr, Formula, Formulas, Proposition};
pub use monitor::{Monitor, MonitorError, Trace, Valuation};

use std::collections::HashSet;
use thiserror::Error;

/// The synthesis objective attached to a specification target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Reach an instant at which the target formula has held.
    Eventually,
    /// Keep the target formula holding at every instant.
    Always,
}

/// A reactive synthesis specification: a pure-past target formula, the
/// goal kind, and the partition of its propositions into environment
/// inputs and controller outputs.
#[derive(Debug, Clone)]
pub struct Spec {
    pub target: Formula,
    pub goal: Goal,
    pub inputs: Vec<Proposition>,
    pub outputs: Vec<Proposition>,
}

/// Rejected input/output declarations of a [`Spec`].
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("proposition `{0}` is declared more than once")]
    DuplicateProposition(String),
    #[error("proposition `{0}` is declared both as input and as output")]
    InputOutputOverlap(String),
}

impl Spec {
    /// Assembles a specification, rejecting duplicated or overlapping
    /// input/output declarations.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] if a proposition appears twice in the
    /// declarations.
    pub fn new(
        target: Formula,
        goal: Goal,
        inputs: Vec<Proposition>,
        outputs: Vec<Proposition>,
    ) -> Result<Self, SpecError> {
        let ctx = target.context().clone();
        let mut seen = HashSet::new();
        for &p in inputs.iter().chain(&outputs) {
            if !seen.insert(p) {
                let name = ctx.proposition_name(p);
                return Err(if inputs.contains(&p) && outputs.contains(&p) {
                    SpecError::InputOutputOverlap(name)
                } else {
                    SpecError::DuplicateProposition(name)
                });
            }
        }
        Ok(Self {
            target,
            goal,
            inputs,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_rejects_overlapping_declarations() {
        let ctx = Formulas::new();
        let p = ctx.proposition("p");
        let q = ctx.proposition("q");
        let target = ctx.atom(p) & ctx.atom(q);

        let err = Spec::new(target.clone(), Goal::Always, vec![p], vec![q, p]).unwrap_err();
        assert!(matches!(err, SpecError::InputOutputOverlap(name) if name == "p"));

        let err = Spec::new(target, Goal::Always, vec![p, p], vec![q]).unwrap_err();
        assert!(matches!(err, SpecError::DuplicateProposition(name) if name == "p"));
    }

    #[test]
    fn rendering_lists_every_section() {
        let ctx = Formulas::new();
        let req = ctx.proposition("req");
        let grant = ctx.proposition("grant");
        let target = ctx.atom(grant).implies(&Formula::once(&ctx.atom(req)));
        let spec = Spec::new(target, Goal::Always, vec![req], vec![grant]).unwrap();

        let rendered = encode(&spec).to_string();
        for section in ["inputs:", "outputs:", "variables:", "init:", "trans:", "objective:"] {
            assert!(rendered.contains(section), "missing section {section}");
        }
        assert!(rendered.contains("- req"));
        assert!(rendered.contains("- grant"));
    }
}
