//! Formula substrate: hash-consed pure-past LTL formulas, the distinct
//! propositional signature used by the produced automata, and the
//! proposition table shared by both.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet, VecDeque},
    fmt,
    rc::Rc,
};

/// An atomic proposition, minted by a [`Formulas`] context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Proposition(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FormulaId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ExprId(usize);

/// How a proposition came into existence. Primed and variable
/// propositions are derived; derivation is injective, so interning the
/// name yields referentially stable ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PropName {
    Named(String),
    Primed(Proposition),
    Variable(FormulaId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FormulaNode {
    Const(bool),
    Atom(Proposition),
    Not(FormulaId),
    And(FormulaId, FormulaId),
    Or(FormulaId, FormulaId),
    Implies(FormulaId, FormulaId),
    Iff(FormulaId, FormulaId),
    Yesterday(FormulaId),
    WYesterday(FormulaId),
    Once(FormulaId),
    Historically(FormulaId),
    Since(FormulaId, FormulaId),
    Triggered(FormulaId, FormulaId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ExprNode {
    Const(bool),
    Atom(Proposition),
    Not(ExprId),
    And(ExprId, ExprId),
    Or(ExprId, ExprId),
    Iff(ExprId, ExprId),
}

#[derive(Debug, Default)]
struct Arena {
    props: Vec<PropName>,
    prop_index: HashMap<PropName, Proposition>,
    formulas: Vec<FormulaNode>,
    formula_index: HashMap<FormulaNode, FormulaId>,
    exprs: Vec<ExprNode>,
    expr_index: HashMap<ExprNode, ExprId>,
}

/// Interning context for propositions, pure-past formulas and
/// propositional expressions. Cloning shares the context; formulas from
/// different contexts cannot be combined.
#[derive(Debug, Clone, Default)]
pub struct Formulas(Rc<RefCell<Arena>>);

impl Formulas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints (or returns) the proposition with the given name.
    pub fn proposition(&self, name: &str) -> Proposition {
        self.intern_prop(PropName::Named(name.to_string()))
    }

    /// The successor-state counterpart of `p`. Stable and injective.
    pub fn primed(&self, p: Proposition) -> Proposition {
        self.intern_prop(PropName::Primed(p))
    }

    #[must_use]
    pub fn atom(&self, p: Proposition) -> Formula {
        Formula::wrap(self, self.intern_formula(FormulaNode::Atom(p)))
    }

    #[must_use]
    pub fn constant(&self, value: bool) -> Formula {
        Formula::wrap(self, self.intern_formula(FormulaNode::Const(value)))
    }

    #[must_use]
    pub fn expr_atom(&self, p: Proposition) -> Expr {
        Expr::wrap(self, self.intern_expr(ExprNode::Atom(p)))
    }

    #[must_use]
    pub fn expr_constant(&self, value: bool) -> Expr {
        Expr::wrap(self, self.intern_expr(ExprNode::Const(value)))
    }

    /// Flat conjunction: `true` when empty, the sole conjunct when
    /// singleton, a left-folded `&` chain otherwise.
    pub fn conjunction(&self, items: impl IntoIterator<Item = Expr>) -> Expr {
        items
            .into_iter()
            .reduce(|acc, item| acc & item)
            .unwrap_or_else(|| self.expr_constant(true))
    }

    /// The state variable standing for the one-step-past requirement
    /// `req`. Interned by the requirement itself, so structurally equal
    /// requirements share one proposition.
    pub(crate) fn variable_for(&self, req: FormulaId) -> Proposition {
        self.intern_prop(PropName::Variable(req))
    }

    /// Undoes [`Formulas::primed`], if `p` was minted by it.
    pub(crate) fn primed_base(&self, p: Proposition) -> Option<Proposition> {
        match self.0.borrow().props[p.0] {
            PropName::Primed(base) => Some(base),
            _ => None,
        }
    }

    fn intern_prop(&self, name: PropName) -> Proposition {
        let mut arena = self.0.borrow_mut();
        if let Some(&p) = arena.prop_index.get(&name) {
            return p;
        }
        let p = Proposition(arena.props.len());
        arena.props.push(name.clone());
        arena.prop_index.insert(name, p);
        p
    }

    pub(crate) fn intern_formula(&self, node: FormulaNode) -> FormulaId {
        let mut arena = self.0.borrow_mut();
        if let Some(&id) = arena.formula_index.get(&node) {
            return id;
        }
        let id = FormulaId(arena.formulas.len());
        arena.formulas.push(node);
        arena.formula_index.insert(node, id);
        id
    }

    pub(crate) fn intern_expr(&self, node: ExprNode) -> ExprId {
        let mut arena = self.0.borrow_mut();
        if let Some(&id) = arena.expr_index.get(&node) {
            return id;
        }
        let id = ExprId(arena.exprs.len());
        arena.exprs.push(node);
        arena.expr_index.insert(node, id);
        id
    }

    pub(crate) fn formula_node(&self, id: FormulaId) -> FormulaNode {
        self.0.borrow().formulas[id.0]
    }

    pub(crate) fn expr_node(&self, id: ExprId) -> ExprNode {
        self.0.borrow().exprs[id.0]
    }

    /// Every distinct subformula of `root`, the root included, in
    /// breadth-first discovery order. Hash-consing makes the formula a
    /// dag, so the visited set also bounds the walk.
    pub(crate) fn subformulas_deep(&self, root: FormulaId) -> Vec<FormulaId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            match self.formula_node(id) {
                FormulaNode::Const(_) | FormulaNode::Atom(_) => {}
                FormulaNode::Not(sub)
                | FormulaNode::Yesterday(sub)
                | FormulaNode::WYesterday(sub)
                | FormulaNode::Once(sub)
                | FormulaNode::Historically(sub) => queue.push_back(sub),
                FormulaNode::And(lhs, rhs)
                | FormulaNode::Or(lhs, rhs)
                | FormulaNode::Implies(lhs, rhs)
                | FormulaNode::Iff(lhs, rhs)
                | FormulaNode::Since(lhs, rhs)
                | FormulaNode::Triggered(lhs, rhs) => {
                    queue.push_back(lhs);
                    queue.push_back(rhs);
                }
            }
        }
        order
    }

    fn nnf(&self, f: FormulaId, negated: bool) -> FormulaId {
        match self.formula_node(f) {
            FormulaNode::Const(value) => self.intern_formula(FormulaNode::Const(value != negated)),
            FormulaNode::Atom(_) => {
                if negated {
                    self.intern_formula(FormulaNode::Not(f))
                } else {
                    f
                }
            }
            FormulaNode::Not(sub) => self.nnf(sub, !negated),
            FormulaNode::And(lhs, rhs) => {
                let lhs = self.nnf(lhs, negated);
                let rhs = self.nnf(rhs, negated);
                self.intern_formula(if negated {
                    FormulaNode::Or(lhs, rhs)
                } else {
                    FormulaNode::And(lhs, rhs)
                })
            }
            FormulaNode::Or(lhs, rhs) => {
                let lhs = self.nnf(lhs, negated);
                let rhs = self.nnf(rhs, negated);
                self.intern_formula(if negated {
                    FormulaNode::And(lhs, rhs)
                } else {
                    FormulaNode::Or(lhs, rhs)
                })
            }
            // a -> b is !a | b; negated, a & !b
            FormulaNode::Implies(lhs, rhs) => {
                let lhs = self.nnf(lhs, !negated);
                let rhs = self.nnf(rhs, negated);
                self.intern_formula(if negated {
                    FormulaNode::And(lhs, rhs)
                } else {
                    FormulaNode::Or(lhs, rhs)
                })
            }
            // a <-> b is (a -> b) & (b -> a) before the rewrite recurses
            FormulaNode::Iff(lhs, rhs) => {
                let fwd = self.nnf(self.intern_formula(FormulaNode::Implies(lhs, rhs)), negated);
                let bwd = self.nnf(self.intern_formula(FormulaNode::Implies(rhs, lhs)), negated);
                self.intern_formula(if negated {
                    FormulaNode::Or(fwd, bwd)
                } else {
                    FormulaNode::And(fwd, bwd)
                })
            }
            FormulaNode::Yesterday(sub) => {
                let sub = self.nnf(sub, negated);
                self.intern_formula(if negated {
                    FormulaNode::WYesterday(sub)
                } else {
                    FormulaNode::Yesterday(sub)
                })
            }
            FormulaNode::WYesterday(sub) => {
                let sub = self.nnf(sub, negated);
                self.intern_formula(if negated {
                    FormulaNode::Yesterday(sub)
                } else {
                    FormulaNode::WYesterday(sub)
                })
            }
            FormulaNode::Once(sub) => {
                let sub = self.nnf(sub, negated);
                self.intern_formula(if negated {
                    FormulaNode::Historically(sub)
                } else {
                    FormulaNode::Once(sub)
                })
            }
            FormulaNode::Historically(sub) => {
                let sub = self.nnf(sub, negated);
                self.intern_formula(if negated {
                    FormulaNode::Once(sub)
                } else {
                    FormulaNode::Historically(sub)
                })
            }
            FormulaNode::Since(lhs, rhs) => {
                let lhs = self.nnf(lhs, negated);
                let rhs = self.nnf(rhs, negated);
                self.intern_formula(if negated {
                    FormulaNode::Triggered(lhs, rhs)
                } else {
                    FormulaNode::Since(lhs, rhs)
                })
            }
            FormulaNode::Triggered(lhs, rhs) => {
                let lhs = self.nnf(lhs, negated);
                let rhs = self.nnf(rhs, negated);
                self.intern_formula(if negated {
                    FormulaNode::Since(lhs, rhs)
                } else {
                    FormulaNode::Triggered(lhs, rhs)
                })
            }
        }
    }

    fn is_nnf(&self, f: FormulaId) -> bool {
        match self.formula_node(f) {
            FormulaNode::Const(_) | FormulaNode::Atom(_) => true,
            FormulaNode::Not(sub) => matches!(
                self.formula_node(sub),
                FormulaNode::Const(_) | FormulaNode::Atom(_)
            ),
            FormulaNode::Implies(_, _) | FormulaNode::Iff(_, _) => false,
            FormulaNode::Yesterday(sub)
            | FormulaNode::WYesterday(sub)
            | FormulaNode::Once(sub)
            | FormulaNode::Historically(sub) => self.is_nnf(sub),
            FormulaNode::And(lhs, rhs)
            | FormulaNode::Or(lhs, rhs)
            | FormulaNode::Since(lhs, rhs)
            | FormulaNode::Triggered(lhs, rhs) => self.is_nnf(lhs) && self.is_nnf(rhs),
        }
    }

    pub(crate) fn proposition_name(&self, p: Proposition) -> String {
        let name = self.0.borrow().props[p.0].clone();
        match name {
            PropName::Named(name) => name,
            PropName::Primed(base) => format!("{}'", self.proposition_name(base)),
            PropName::Variable(req) => format!("{{{}}}", self.formula_string(req)),
        }
    }

    pub(crate) fn formula_string(&self, f: FormulaId) -> String {
        match self.formula_node(f) {
            FormulaNode::Const(value) => value.to_string(),
            FormulaNode::Atom(p) => self.proposition_name(p),
            FormulaNode::Not(sub) => format!("!{}", self.formula_string(sub)),
            FormulaNode::And(lhs, rhs) => {
                format!("({} & {})", self.formula_string(lhs), self.formula_string(rhs))
            }
            FormulaNode::Or(lhs, rhs) => {
                format!("({} | {})", self.formula_string(lhs), self.formula_string(rhs))
            }
            FormulaNode::Implies(lhs, rhs) => {
                format!("({} -> {})", self.formula_string(lhs), self.formula_string(rhs))
            }
            FormulaNode::Iff(lhs, rhs) => {
                format!("({} <-> {})", self.formula_string(lhs), self.formula_string(rhs))
            }
            FormulaNode::Yesterday(sub) => format!("Y {}", self.formula_string(sub)),
            FormulaNode::WYesterday(sub) => format!("Z {}", self.formula_string(sub)),
            FormulaNode::Once(sub) => format!("O {}", self.formula_string(sub)),
            FormulaNode::Historically(sub) => format!("H {}", self.formula_string(sub)),
            FormulaNode::Since(lhs, rhs) => {
                format!("({} S {})", self.formula_string(lhs), self.formula_string(rhs))
            }
            FormulaNode::Triggered(lhs, rhs) => {
                format!("({} T {})", self.formula_string(lhs), self.formula_string(rhs))
            }
        }
    }

    fn expr_string(&self, e: ExprId) -> String {
        match self.expr_node(e) {
            ExprNode::Const(value) => value.to_string(),
            ExprNode::Atom(p) => self.proposition_name(p),
            ExprNode::Not(sub) => format!("!{}", self.expr_string(sub)),
            ExprNode::And(lhs, rhs) => {
                format!("({} & {})", self.expr_string(lhs), self.expr_string(rhs))
            }
            ExprNode::Or(lhs, rhs) => {
                format!("({} | {})", self.expr_string(lhs), self.expr_string(rhs))
            }
            ExprNode::Iff(lhs, rhs) => {
                format!("({} <-> {})", self.expr_string(lhs), self.expr_string(rhs))
            }
        }
    }

    fn same_context(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A pure-past LTL formula: a cheap handle into a [`Formulas`] context.
/// Structural equality is handle equality thanks to hash-consing.
#[derive(Clone)]
pub struct Formula {
    ctx: Formulas,
    id: FormulaId,
}

impl Formula {
    pub(crate) fn wrap(ctx: &Formulas, id: FormulaId) -> Self {
        Self {
            ctx: ctx.clone(),
            id,
        }
    }

    pub(crate) fn id(&self) -> FormulaId {
        self.id
    }

    #[must_use]
    pub fn context(&self) -> &Formulas {
        &self.ctx
    }

    #[must_use]
    pub fn implies(&self, conclusion: &Self) -> Self {
        assert!(self.ctx.same_context(&conclusion.ctx));
        Self::wrap(
            &self.ctx,
            self.ctx
                .intern_formula(FormulaNode::Implies(self.id, conclusion.id)),
        )
    }

    #[must_use]
    pub fn iff(&self, other: &Self) -> Self {
        assert!(self.ctx.same_context(&other.ctx));
        Self::wrap(
            &self.ctx,
            self.ctx.intern_formula(FormulaNode::Iff(self.id, other.id)),
        )
    }

    /// `Y f`: `f` held one step ago; false at the initial instant.
    #[must_use]
    pub fn yesterday(formula: &Self) -> Self {
        Self::wrap(
            &formula.ctx,
            formula.ctx.intern_formula(FormulaNode::Yesterday(formula.id)),
        )
    }

    /// `Z f`: `f` held one step ago; vacuously true at the initial
    /// instant.
    #[must_use]
    pub fn w_yesterday(formula: &Self) -> Self {
        Self::wrap(
            &formula.ctx,
            formula.ctx.intern_formula(FormulaNode::WYesterday(formula.id)),
        )
    }

    /// `O f`: `f` held at some past or present instant.
    #[must_use]
    pub fn once(formula: &Self) -> Self {
        Self::wrap(
            &formula.ctx,
            formula.ctx.intern_formula(FormulaNode::Once(formula.id)),
        )
    }

    /// `H f`: `f` held at every past and present instant.
    #[must_use]
    pub fn historically(formula: &Self) -> Self {
        Self::wrap(
            &formula.ctx,
            formula.ctx.intern_formula(FormulaNode::Historically(formula.id)),
        )
    }

    /// `self S other`: `other` held at some point, and `self` has held
    /// continuously since then, up to and including now.
    #[must_use]
    pub fn since(&self, other: &Self) -> Self {
        assert!(self.ctx.same_context(&other.ctx));
        Self::wrap(
            &self.ctx,
            self.ctx.intern_formula(FormulaNode::Since(self.id, other.id)),
        )
    }

    /// `self T other`: `other` has always held, or `self` held at some
    /// point and `other` has held continuously since.
    #[must_use]
    pub fn triggered(&self, other: &Self) -> Self {
        assert!(self.ctx.same_context(&other.ctx));
        Self::wrap(
            &self.ctx,
            self.ctx
                .intern_formula(FormulaNode::Triggered(self.id, other.id)),
        )
    }

    /// Returns true when every negation applies directly to an atom or
    /// constant and no implication or biconditional remains.
    #[must_use]
    pub fn is_nnf(&self) -> bool {
        self.ctx.is_nnf(self.id)
    }

    /// Returns an equivalent formula in negation normal form.
    #[must_use]
    pub fn to_nnf(&self) -> Self {
        Self::wrap(&self.ctx, self.ctx.nnf(self.id, false))
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.ctx.same_context(&other.ctx) && self.id == other.id
    }
}

impl Eq for Formula {}

impl std::ops::Not for Formula {
    type Output = Self;

    fn not(self) -> Self::Output {
        let id = self.ctx.intern_formula(FormulaNode::Not(self.id));
        Self { ctx: self.ctx, id }
    }
}

impl std::ops::BitAnd for Formula {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        assert!(self.ctx.same_context(&rhs.ctx));
        let id = self.ctx.intern_formula(FormulaNode::And(self.id, rhs.id));
        Self { ctx: self.ctx, id }
    }
}

impl std::ops::BitOr for Formula {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        assert!(self.ctx.same_context(&rhs.ctx));
        let id = self.ctx.intern_formula(FormulaNode::Or(self.id, rhs.id));
        Self { ctx: self.ctx, id }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ctx.formula_string(self.id))
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A purely propositional expression over current-state and primed
/// propositions; the formula type of the produced automata.
#[derive(Clone)]
pub struct Expr {
    ctx: Formulas,
    id: ExprId,
}

impl Expr {
    pub(crate) fn wrap(ctx: &Formulas, id: ExprId) -> Self {
        Self {
            ctx: ctx.clone(),
            id,
        }
    }

    pub(crate) fn id(&self) -> ExprId {
        self.id
    }

    #[must_use]
    pub fn context(&self) -> &Formulas {
        &self.ctx
    }

    #[must_use]
    pub fn iff(&self, other: &Self) -> Self {
        assert!(self.ctx.same_context(&other.ctx));
        Self::wrap(&self.ctx, self.ctx.intern_expr(ExprNode::Iff(self.id, other.id)))
    }

    /// The top-level conjuncts of the `&` spine, left to right.
    #[must_use]
    pub fn conjuncts(&self) -> Vec<Self> {
        fn walk(ctx: &Formulas, id: ExprId, out: &mut Vec<Expr>) {
            match ctx.expr_node(id) {
                ExprNode::And(lhs, rhs) => {
                    walk(ctx, lhs, out);
                    walk(ctx, rhs, out);
                }
                _ => out.push(Expr::wrap(ctx, id)),
            }
        }
        let mut out = Vec::new();
        walk(&self.ctx, self.id, &mut out);
        out
    }

    /// The proposition and polarity of a literal, if this is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<(Proposition, bool)> {
        match self.ctx.expr_node(self.id) {
            ExprNode::Atom(p) => Some((p, true)),
            ExprNode::Not(sub) => match self.ctx.expr_node(sub) {
                ExprNode::Atom(p) => Some((p, false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// The proposition of a bare atom, if this is one.
    #[must_use]
    pub fn as_atom(&self) -> Option<Proposition> {
        match self.ctx.expr_node(self.id) {
            ExprNode::Atom(p) => Some(p),
            _ => None,
        }
    }

    /// The two sides of a `<->`, if this is one.
    #[must_use]
    pub fn as_biconditional(&self) -> Option<(Self, Self)> {
        match self.ctx.expr_node(self.id) {
            ExprNode::Iff(lhs, rhs) => {
                Some((Self::wrap(&self.ctx, lhs), Self::wrap(&self.ctx, rhs)))
            }
            _ => None,
        }
    }

    pub(crate) fn is_const_true(&self) -> bool {
        matches!(self.ctx.expr_node(self.id), ExprNode::Const(true))
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ctx.same_context(&other.ctx) && self.id == other.id
    }
}

impl Eq for Expr {}

impl std::ops::Not for Expr {
    type Output = Self;

    fn not(self) -> Self::Output {
        let id = self.ctx.intern_expr(ExprNode::Not(self.id));
        Self { ctx: self.ctx, id }
    }
}

impl std::ops::BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        assert!(self.ctx.same_context(&rhs.ctx));
        let id = self.ctx.intern_expr(ExprNode::And(self.id, rhs.id));
        Self { ctx: self.ctx, id }
    }
}

impl std::ops::BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        assert!(self.ctx.same_context(&rhs.ctx));
        let id = self.ctx.intern_expr(ExprNode::Or(self.id, rhs.id));
        Self { ctx: self.ctx, id }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ctx.expr_string(self.id))
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(ctx: &Formulas) -> (Formula, Formula) {
        (ctx.atom(ctx.proposition("p")), ctx.atom(ctx.proposition("q")))
    }

    #[test]
    fn interning_shares_equal_subformulas() {
        let ctx = Formulas::new();
        let (p, q) = atoms(&ctx);

        let left = Formula::yesterday(&p);
        let right = Formula::yesterday(&ctx.atom(ctx.proposition("p")));
        assert_eq!(left, right);

        let once = Formula::once(&(p.clone() & q.clone()));
        assert_eq!(once, Formula::once(&(p & q)));
    }

    #[test]
    fn negation_pushes_through_operator_duals() {
        let ctx = Formulas::new();
        let (p, q) = atoms(&ctx);

        let cases = [
            (!Formula::yesterday(&p), "Z !p"),
            (!Formula::w_yesterday(&p), "Y !p"),
            (!Formula::once(&p), "H !p"),
            (!Formula::historically(&p), "O !p"),
            (!p.since(&q), "(!p T !q)"),
            (!p.triggered(&q), "(!p S !q)"),
            (!(p.clone() & q.clone()), "(!p | !q)"),
            (!(p.clone() | q.clone()), "(!p & !q)"),
            (p.implies(&q), "(!p | q)"),
            (!p.implies(&q), "(p & !q)"),
            (!!p.clone(), "p"),
            (!ctx.constant(true), "false"),
        ];
        for (formula, expected) in cases {
            assert_eq!(formula.to_nnf().to_string(), expected);
        }
    }

    #[test]
    fn biconditional_expands_to_both_implications() {
        let ctx = Formulas::new();
        let (p, q) = atoms(&ctx);

        assert_eq!(p.iff(&q).to_nnf().to_string(), "((!p | q) & (!q | p))");
        assert_eq!(
            (!p.iff(&q)).to_nnf().to_string(),
            "((p & !q) | (q & !p))"
        );
    }

    #[test]
    fn nnf_is_idempotent() {
        let ctx = Formulas::new();
        let (p, q) = atoms(&ctx);

        let corpus = [
            !(p.clone() & Formula::yesterday(&q)),
            !(Formula::once(&p).implies(&Formula::historically(&q))),
            p.iff(&q.since(&p)),
            !(!p.triggered(&!Formula::w_yesterday(&q))),
        ];
        for formula in corpus {
            let once = formula.to_nnf();
            assert!(once.is_nnf());
            assert_eq!(once.to_nnf(), once);
        }
    }

    #[test]
    fn rendering_covers_the_signature() {
        let ctx = Formulas::new();
        let (p, q) = atoms(&ctx);

        let formula = Formula::historically(&p.clone().implies(&q)) & Formula::once(&p.since(&q));
        assert_eq!(formula.to_string(), "(H (p -> q) & O (p S q))");

        let primed = ctx.primed(ctx.proposition("p"));
        assert_eq!(ctx.proposition_name(primed), "p'");
    }
}
