//! Symbolic automaton construction: auxiliary-variable collection and
//! the separated-normal-form translation of pure-past operators.

use crate::{
    logic::{Expr, FormulaId, FormulaNode, Formulas, Proposition},
    Goal, Spec,
};
use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
};

/// A symbolic transition system produced from a [`Spec`].
///
/// All formulas are purely propositional: `init` and `objective` range
/// over the state variables, `trans` additionally over their primed
/// counterparts and the declared inputs and outputs.
#[derive(Clone)]
pub struct Automaton {
    pub inputs: Vec<Proposition>,
    pub outputs: Vec<Proposition>,
    pub variables: Vec<Proposition>,
    pub init: Expr,
    pub trans: Expr,
    pub objective: Expr,
}

/// Per-encoding state: the one-step-past requirements in discovery
/// order, split by family, and the requirement-to-variable memo table.
struct Encoder {
    ctx: Formulas,
    yreqs: Vec<FormulaId>,
    zreqs: Vec<FormulaId>,
    order: Vec<FormulaId>,
    registry: HashMap<FormulaId, Proposition>,
}

impl Encoder {
    fn new(ctx: &Formulas) -> Self {
        Self {
            ctx: ctx.clone(),
            yreqs: Vec::new(),
            zreqs: Vec::new(),
            order: Vec::new(),
            registry: HashMap::new(),
        }
    }

    /// Registers a `Y`/`Z` requirement, minting its state variable on
    /// first sight. Structurally equal requirements share one variable.
    fn register(&mut self, req: FormulaId) {
        let Entry::Vacant(entry) = self.registry.entry(req) else {
            return;
        };
        entry.insert(self.ctx.variable_for(req));
        self.order.push(req);
        match self.ctx.formula_node(req) {
            FormulaNode::Yesterday(_) => self.yreqs.push(req),
            FormulaNode::WYesterday(_) => self.zreqs.push(req),
            _ => unreachable!("every requirement is a one-step-past formula"),
        }
    }

    /// Walks the target once and registers every requirement: the goal
    /// witness first, then one per past-operator subformula.
    fn collect(&mut self, goal: Goal, target: FormulaId) {
        let witness = self.goal_requirement(goal, target);
        self.register(witness);

        for sub in self.ctx.subformulas_deep(target) {
            match self.ctx.formula_node(sub) {
                FormulaNode::Yesterday(_) | FormulaNode::WYesterday(_) => self.register(sub),
                FormulaNode::Once(_) | FormulaNode::Since(_, _) => {
                    let req = self.ctx.intern_formula(FormulaNode::Yesterday(sub));
                    self.register(req);
                }
                FormulaNode::Historically(_) | FormulaNode::Triggered(_, _) => {
                    let req = self.ctx.intern_formula(FormulaNode::WYesterday(sub));
                    self.register(req);
                }
                _ => {}
            }
        }
    }

    fn goal_requirement(&self, goal: Goal, target: FormulaId) -> FormulaId {
        match goal {
            Goal::Eventually => self.ctx.intern_formula(FormulaNode::Yesterday(target)),
            Goal::Always => self.ctx.intern_formula(FormulaNode::WYesterday(target)),
        }
    }

    fn variable(&self, req: FormulaId) -> Proposition {
        self.registry
            .get(&req)
            .copied()
            .unwrap_or_else(|| unreachable!("requirement was not registered by the collector"))
    }

    fn argument(&self, req: FormulaId) -> FormulaId {
        match self.ctx.formula_node(req) {
            FormulaNode::Yesterday(arg) | FormulaNode::WYesterday(arg) => arg,
            _ => unreachable!("every requirement is a one-step-past formula"),
        }
    }

    /// Rewrites an NNF formula into a propositional expression over
    /// current-state variables, unfolding each unbounded past operator
    /// one step through its fixpoint equivalence.
    fn snf(&self, f: FormulaId) -> Expr {
        let ctx = &self.ctx;
        match ctx.formula_node(f) {
            FormulaNode::Const(value) => ctx.expr_constant(value),
            FormulaNode::Atom(p) => ctx.expr_atom(p),
            FormulaNode::Not(sub) => !self.snf(sub),
            FormulaNode::And(lhs, rhs) => self.snf(lhs) & self.snf(rhs),
            FormulaNode::Or(lhs, rhs) => self.snf(lhs) | self.snf(rhs),
            FormulaNode::Yesterday(_) | FormulaNode::WYesterday(_) => {
                ctx.expr_atom(self.variable(f))
            }
            // O f = f | Y O f
            FormulaNode::Once(sub) => {
                let req = ctx.intern_formula(FormulaNode::Yesterday(f));
                self.snf(sub) | ctx.expr_atom(self.variable(req))
            }
            // H f = f & Z H f
            FormulaNode::Historically(sub) => {
                let req = ctx.intern_formula(FormulaNode::WYesterday(f));
                self.snf(sub) & ctx.expr_atom(self.variable(req))
            }
            // f S g = g | (f & Y (f S g))
            FormulaNode::Since(lhs, rhs) => {
                let req = ctx.intern_formula(FormulaNode::Yesterday(f));
                self.snf(rhs) | (self.snf(lhs) & ctx.expr_atom(self.variable(req)))
            }
            // f T g = g & (f | Z (f T g))
            FormulaNode::Triggered(lhs, rhs) => {
                let req = ctx.intern_formula(FormulaNode::WYesterday(f));
                self.snf(rhs) & (self.snf(lhs) | ctx.expr_atom(self.variable(req)))
            }
            FormulaNode::Implies(_, _) | FormulaNode::Iff(_, _) => {
                unreachable!("translated formulas are in negation normal form")
            }
        }
    }

    fn variables(&self) -> Vec<Proposition> {
        self.order.iter().map(|&req| self.variable(req)).collect()
    }
}

/// Encodes a specification into its symbolic automaton.
///
/// The target is rewritten into negation normal form, every distinct
/// one-step-past requirement receives a state variable, and the three
/// predicates are assembled: `init` fixes the initial-instant polarity
/// of every variable, `trans` constrains each primed variable to the
/// translated truth value of its requirement's argument, and
/// `objective` is the goal witness variable.
#[must_use]
pub fn encode(spec: &Spec) -> Automaton {
    let ctx = spec.target.context().clone();
    let target = spec.target.to_nnf();
    tracing::debug!("target in negation normal form: {target}");

    let mut encoder = Encoder::new(&ctx);
    encoder.collect(spec.goal, target.id());
    tracing::debug!(
        "collected {} state variables ({} strict, {} weak)",
        encoder.order.len(),
        encoder.yreqs.len(),
        encoder.zreqs.len()
    );

    // No predecessor exists at the initial instant: strict one-step-past
    // facts are false, weak ones vacuously true.
    let init = ctx.conjunction(
        encoder
            .zreqs
            .iter()
            .map(|&req| ctx.expr_atom(encoder.variable(req)))
            .chain(
                encoder
                    .yreqs
                    .iter()
                    .map(|&req| !ctx.expr_atom(encoder.variable(req))),
            ),
    );

    let trans = ctx.conjunction(encoder.order.iter().map(|&req| {
        let next = ctx.expr_atom(ctx.primed(encoder.variable(req)));
        next.iff(&encoder.snf(encoder.argument(req)))
    }));

    let witness = encoder.goal_requirement(spec.goal, target.id());
    let objective = ctx.expr_atom(encoder.variable(witness));

    Automaton {
        inputs: spec.inputs.clone(),
        outputs: spec.outputs.clone(),
        variables: encoder.variables(),
        init,
        trans,
        objective,
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.init.context();
        writeln!(f, "inputs:")?;
        for &p in &self.inputs {
            writeln!(f, "- {}", ctx.proposition_name(p))?;
        }
        writeln!(f, "\noutputs:")?;
        for &p in &self.outputs {
            writeln!(f, "- {}", ctx.proposition_name(p))?;
        }
        writeln!(f, "\nvariables:")?;
        for &p in &self.variables {
            writeln!(f, "- {}", ctx.proposition_name(p))?;
        }
        writeln!(f, "\ninit:")?;
        writeln!(f, "- {}", self.init)?;
        writeln!(f, "\ntrans:")?;
        writeln!(f, "- {}", self.trans)?;
        writeln!(f, "\nobjective:")?;
        write!(f, "- {}", self.objective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Formula;
    use std::collections::HashSet;

    #[test]
    fn eventually_atom() {
        let ctx = Formulas::new();
        let p = ctx.proposition("p");
        let spec = Spec::new(ctx.atom(p), Goal::Eventually, vec![], vec![p]).unwrap();

        let automaton = encode(&spec);
        assert!(automaton.inputs.is_empty());
        assert_eq!(automaton.outputs, vec![p]);
        assert_eq!(automaton.variables.len(), 1);
        assert_eq!(automaton.init.to_string(), "!{Y p}");
        assert_eq!(automaton.trans.to_string(), "({Y p}' <-> p)");
        assert_eq!(automaton.objective.to_string(), "{Y p}");
    }

    #[test]
    fn always_atom() {
        let ctx = Formulas::new();
        let p = ctx.proposition("p");
        let spec = Spec::new(ctx.atom(p), Goal::Always, vec![], vec![p]).unwrap();

        let automaton = encode(&spec);
        assert_eq!(automaton.variables.len(), 1);
        assert_eq!(automaton.init.to_string(), "{Z p}");
        assert_eq!(automaton.trans.to_string(), "({Z p}' <-> p)");
        assert_eq!(automaton.objective.to_string(), "{Z p}");
    }

    #[test]
    fn eventually_once_shares_the_goal_witness() {
        let ctx = Formulas::new();
        let p = ctx.proposition("p");
        let target = Formula::once(&ctx.atom(p));
        let spec = Spec::new(target, Goal::Eventually, vec![], vec![p]).unwrap();

        // The goal witness Y (O p) and the unfolding variable of the
        // `once` subformula are the same requirement, hence one variable.
        let automaton = encode(&spec);
        assert_eq!(automaton.variables.len(), 1);
        assert_eq!(automaton.init.to_string(), "!{Y O p}");
        assert_eq!(automaton.trans.to_string(), "({Y O p}' <-> (p | {Y O p}))");
        assert_eq!(automaton.objective.to_string(), "{Y O p}");
    }

    #[test]
    fn duplicate_requirements_share_one_variable() {
        let ctx = Formulas::new();
        let p = ctx.atom(ctx.proposition("p"));
        let q = ctx.atom(ctx.proposition("q"));
        let target = Formula::yesterday(&p) & (q | Formula::yesterday(&p));
        let spec = Spec::new(
            target,
            Goal::Eventually,
            vec![ctx.proposition("p")],
            vec![ctx.proposition("q")],
        )
        .unwrap();

        let automaton = encode(&spec);
        assert_eq!(automaton.variables.len(), 2);
        let distinct: HashSet<_> = automaton.variables.iter().copied().collect();
        assert_eq!(distinct.len(), automaton.variables.len());
    }

    #[test]
    fn one_variable_per_binary_operator_instance() {
        let ctx = Formulas::new();
        let p = ctx.atom(ctx.proposition("p"));
        let q = ctx.atom(ctx.proposition("q"));
        let spec = Spec::new(
            p.since(&q),
            Goal::Eventually,
            vec![ctx.proposition("p")],
            vec![ctx.proposition("q")],
        )
        .unwrap();

        let automaton = encode(&spec);
        assert_eq!(automaton.variables.len(), 1);
        assert_eq!(
            automaton.trans.to_string(),
            "({Y (p S q)}' <-> (q | (p & {Y (p S q)})))"
        );
    }

    #[test]
    fn init_polarity_follows_the_requirement_family() {
        let ctx = Formulas::new();
        let p = ctx.atom(ctx.proposition("p"));
        let q = ctx.atom(ctx.proposition("q"));
        let target = Formula::once(&p) & Formula::historically(&q);
        let spec = Spec::new(
            target,
            Goal::Eventually,
            vec![ctx.proposition("p")],
            vec![ctx.proposition("q")],
        )
        .unwrap();

        let automaton = encode(&spec);
        assert_eq!(automaton.variables.len(), 3);
        let conjuncts = automaton.init.conjuncts();
        assert_eq!(conjuncts.len(), 3);
        for conjunct in conjuncts {
            let (var, positive) = conjunct.as_literal().expect("init conjuncts are literals");
            assert_eq!(positive, ctx.proposition_name(var).starts_with("{Z"));
        }
    }

    #[test]
    fn trans_constrains_every_variable_exactly_once() {
        let ctx = Formulas::new();
        let p = ctx.atom(ctx.proposition("p"));
        let q = ctx.atom(ctx.proposition("q"));
        let target = Formula::once(&p) & (Formula::historically(&q) | p.since(&q));
        let spec = Spec::new(
            target,
            Goal::Always,
            vec![ctx.proposition("p")],
            vec![ctx.proposition("q")],
        )
        .unwrap();

        let automaton = encode(&spec);
        let constrained: Vec<_> = automaton
            .trans
            .conjuncts()
            .into_iter()
            .map(|conjunct| {
                let (lhs, _) = conjunct
                    .as_biconditional()
                    .expect("trans conjuncts are biconditionals");
                let primed = lhs.as_atom().expect("left side is a primed variable");
                ctx.primed_base(primed).expect("left side is primed")
            })
            .collect();
        assert_eq!(constrained, automaton.variables);
    }

    #[test]
    fn snf_unfolds_each_past_operator_one_step() {
        let ctx = Formulas::new();
        let p = ctx.atom(ctx.proposition("p"));
        let q = ctx.atom(ctx.proposition("q"));

        let cases = [
            (Formula::once(&p), Goal::Eventually, "(p | {Y O p})"),
            (Formula::historically(&q), Goal::Always, "(q & {Z H q})"),
            (p.since(&q), Goal::Eventually, "(q | (p & {Y (p S q)}))"),
            (p.triggered(&q), Goal::Always, "(q & (p | {Z (p T q)}))"),
        ];
        for (formula, goal, expected) in cases {
            let mut encoder = Encoder::new(&ctx);
            encoder.collect(goal, formula.id());
            assert_eq!(encoder.snf(formula.id()).to_string(), expected);
        }
    }

    #[test]
    #[should_panic(expected = "negation normal form")]
    fn snf_rejects_surviving_implications() {
        let ctx = Formulas::new();
        let p = ctx.atom(ctx.proposition("p"));
        let q = ctx.atom(ctx.proposition("q"));

        let encoder = Encoder::new(&ctx);
        let _ = encoder.snf(p.implies(&q).id());
    }
}
