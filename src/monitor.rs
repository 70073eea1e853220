//! Execution of encoded automata and reference trace semantics for
//! pure-past formulas.

use crate::{
    automaton::Automaton,
    logic::{ExprId, ExprNode, FormulaId, FormulaNode, Formulas, Proposition},
    Formula,
};
use biodivine_lib_bdd::{Bdd, BddValuation, BddVariable, BddVariableSet, BddVariableSetBuilder};
use bitvec::vec::BitVec;
use itertools::Itertools;
use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
};
use thiserror::Error;

/// The propositions holding at a single instant of a trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Valuation(BitVec);

/// A finite sequence of observations.
pub type Trace = Vec<Valuation>;

impl Valuation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, p: Proposition, value: bool) {
        if p.0 >= self.0.len() {
            self.0.resize(p.0 + 1, false);
        }
        self.0.set(p.0, value);
    }

    #[must_use]
    pub fn contains(&self, p: Proposition) -> bool {
        self.0.get(p.0).map_or(false, |bit| *bit)
    }

    pub fn iter(&self) -> impl Iterator<Item = Proposition> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit)
            .map(|(index, _)| Proposition(index))
    }
}

impl FromIterator<Proposition> for Valuation {
    fn from_iter<I: IntoIterator<Item = Proposition>>(iter: I) -> Self {
        let mut valuation = Self::new();
        for p in iter {
            valuation.set(p, true);
        }
        valuation
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.iter().map(|p| p.0).join(", "))
    }
}

fn eval(ctx: &Formulas, f: FormulaId, trace: &[Valuation], at: usize) -> bool {
    match ctx.formula_node(f) {
        FormulaNode::Const(value) => value,
        FormulaNode::Atom(p) => trace[at].contains(p),
        FormulaNode::Not(sub) => !eval(ctx, sub, trace, at),
        FormulaNode::And(lhs, rhs) => eval(ctx, lhs, trace, at) && eval(ctx, rhs, trace, at),
        FormulaNode::Or(lhs, rhs) => eval(ctx, lhs, trace, at) || eval(ctx, rhs, trace, at),
        FormulaNode::Implies(lhs, rhs) => !eval(ctx, lhs, trace, at) || eval(ctx, rhs, trace, at),
        FormulaNode::Iff(lhs, rhs) => eval(ctx, lhs, trace, at) == eval(ctx, rhs, trace, at),
        FormulaNode::Yesterday(sub) => at > 0 && eval(ctx, sub, trace, at - 1),
        FormulaNode::WYesterday(sub) => at == 0 || eval(ctx, sub, trace, at - 1),
        FormulaNode::Once(sub) => {
            eval(ctx, sub, trace, at) || (at > 0 && eval(ctx, f, trace, at - 1))
        }
        FormulaNode::Historically(sub) => {
            eval(ctx, sub, trace, at) && (at == 0 || eval(ctx, f, trace, at - 1))
        }
        FormulaNode::Since(lhs, rhs) => {
            eval(ctx, rhs, trace, at)
                || (at > 0 && eval(ctx, lhs, trace, at) && eval(ctx, f, trace, at - 1))
        }
        FormulaNode::Triggered(lhs, rhs) => {
            eval(ctx, rhs, trace, at)
                && (eval(ctx, lhs, trace, at) || at == 0 || eval(ctx, f, trace, at - 1))
        }
    }
}

impl Formula {
    /// Textbook pure-past semantics of the formula at position `at` of
    /// the finite trace.
    ///
    /// # Panics
    ///
    /// Panics when `at` lies outside the trace.
    #[must_use]
    pub fn holds_on(&self, trace: &[Valuation], at: usize) -> bool {
        assert!(at < trace.len(), "position lies outside the trace");
        eval(self.context(), self.id(), trace, at)
    }
}

/// A rejected hand-built [`Automaton`]; automata produced by
/// [`crate::encode`] always satisfy the expected shape.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("init is not a conjunction of state-variable literals covering each variable once")]
    MalformedInit,
    #[error("trans must constrain each state variable with exactly one primed biconditional")]
    MalformedTransition,
    #[error("formula mentions undeclared proposition `{0}`")]
    UnknownProposition(String),
}

/// Steps a symbolic automaton over observations, one instant at a time.
///
/// The per-variable update functions are read off the `trans`
/// biconditionals and compiled to binary decision diagrams; the initial
/// state is read off the `init` literals.
pub struct Monitor {
    columns: Vec<Proposition>,
    var_index: HashMap<Proposition, usize>,
    initial: Vec<bool>,
    state: Vec<bool>,
    updates: Vec<Bdd>,
    goal: Bdd,
}

impl Monitor {
    /// Compiles the automaton into an executable form, starting in its
    /// initial state.
    ///
    /// # Errors
    ///
    /// Returns a [`MonitorError`] when the automaton does not have the
    /// shape produced by [`crate::encode`].
    pub fn new(automaton: &Automaton) -> Result<Self, MonitorError> {
        let ctx = automaton.init.context().clone();

        let mut builder = BddVariableSetBuilder::new();
        let mut columns = Vec::new();
        let mut bdd_vars = HashMap::new();
        for &p in automaton
            .inputs
            .iter()
            .chain(&automaton.outputs)
            .chain(&automaton.variables)
        {
            if let Entry::Vacant(entry) = bdd_vars.entry(p) {
                // The BDD library rejects variable names containing operator
                // characters (`!`, `&`, `|`, ...), which auxiliary-variable
                // names carry. The name is only a cosmetic label for the
                // library, so use a synthetic, unique, library-safe one; the
                // Proposition -> BddVariable map drives all compilation.
                entry.insert(builder.make_variable(&format!("x{}", columns.len())));
                columns.push(p);
            }
        }
        let set = builder.build();

        let var_index: HashMap<Proposition, usize> = automaton
            .variables
            .iter()
            .enumerate()
            .map(|(index, &p)| (p, index))
            .collect();
        let state_vars: HashMap<Proposition, BddVariable> = automaton
            .variables
            .iter()
            .map(|&p| (p, bdd_vars[&p]))
            .collect();

        let mut initial = vec![None; automaton.variables.len()];
        for conjunct in automaton.init.conjuncts() {
            if conjunct.is_const_true() {
                continue;
            }
            let (p, value) = conjunct.as_literal().ok_or(MonitorError::MalformedInit)?;
            let index = *var_index.get(&p).ok_or(MonitorError::MalformedInit)?;
            if initial[index].replace(value).is_some() {
                return Err(MonitorError::MalformedInit);
            }
        }
        let initial: Vec<bool> = initial
            .into_iter()
            .collect::<Option<_>>()
            .ok_or(MonitorError::MalformedInit)?;

        let mut updates: Vec<Option<Bdd>> = vec![None; automaton.variables.len()];
        for conjunct in automaton.trans.conjuncts() {
            if conjunct.is_const_true() {
                continue;
            }
            let (lhs, rhs) = conjunct
                .as_biconditional()
                .ok_or(MonitorError::MalformedTransition)?;
            let primed = lhs.as_atom().ok_or(MonitorError::MalformedTransition)?;
            let base = ctx
                .primed_base(primed)
                .ok_or(MonitorError::MalformedTransition)?;
            let index = *var_index
                .get(&base)
                .ok_or(MonitorError::MalformedTransition)?;
            let update = compile(&ctx, &set, &bdd_vars, rhs.id())?;
            if updates[index].replace(update).is_some() {
                return Err(MonitorError::MalformedTransition);
            }
        }
        let updates: Vec<Bdd> = updates
            .into_iter()
            .collect::<Option<_>>()
            .ok_or(MonitorError::MalformedTransition)?;

        let goal = compile(&ctx, &set, &state_vars, automaton.objective.id())?;
        tracing::debug!(
            "compiled {} state-variable updates over {} propositions",
            updates.len(),
            columns.len()
        );

        Ok(Self {
            columns,
            var_index,
            state: initial.clone(),
            initial,
            updates,
            goal,
        })
    }

    /// Advances every state variable by one observation and reports
    /// whether the objective holds afterwards. Propositions outside the
    /// automaton's declarations are ignored.
    pub fn step(&mut self, obs: &Valuation) -> bool {
        let valuation = self.valuation(obs);
        self.state = self
            .updates
            .iter()
            .map(|update| update.eval_in(&valuation))
            .collect();
        self.objective()
    }

    /// Whether the objective holds in the current state.
    #[must_use]
    pub fn objective(&self) -> bool {
        self.goal.eval_in(&self.valuation(&Valuation::new()))
    }

    /// The current value of a state variable, if it is one.
    #[must_use]
    pub fn value(&self, variable: Proposition) -> Option<bool> {
        self.var_index.get(&variable).map(|&index| self.state[index])
    }

    /// Returns to the initial state.
    pub fn reset(&mut self) {
        self.state.clone_from(&self.initial);
    }

    fn valuation(&self, obs: &Valuation) -> BddValuation {
        BddValuation::new(
            self.columns
                .iter()
                .map(|&p| {
                    self.var_index
                        .get(&p)
                        .map_or_else(|| obs.contains(p), |&index| self.state[index])
                })
                .collect(),
        )
    }
}

fn compile(
    ctx: &Formulas,
    set: &BddVariableSet,
    allowed: &HashMap<Proposition, BddVariable>,
    expr: ExprId,
) -> Result<Bdd, MonitorError> {
    Ok(match ctx.expr_node(expr) {
        ExprNode::Const(true) => set.mk_true(),
        ExprNode::Const(false) => set.mk_false(),
        ExprNode::Atom(p) => {
            let var = allowed
                .get(&p)
                .ok_or_else(|| MonitorError::UnknownProposition(ctx.proposition_name(p)))?;
            set.mk_var(*var)
        }
        ExprNode::Not(sub) => compile(ctx, set, allowed, sub)?.not(),
        ExprNode::And(lhs, rhs) => {
            compile(ctx, set, allowed, lhs)?.and(&compile(ctx, set, allowed, rhs)?)
        }
        ExprNode::Or(lhs, rhs) => {
            compile(ctx, set, allowed, lhs)?.or(&compile(ctx, set, allowed, rhs)?)
        }
        ExprNode::Iff(lhs, rhs) => {
            compile(ctx, set, allowed, lhs)?.iff(&compile(ctx, set, allowed, rhs)?)
        }
    })
}
