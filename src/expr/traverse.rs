//! Generic walks over child slots: discovery, freeze and cloning.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::choice::Bindings;
use crate::error::Result;
use crate::expr::{Expr, ExprKind, Term};
use crate::variable::{Count, Limit, ListSpec, RangeSpec, VarId, VarKind, Variable};

impl ExprKind {
    /// Calls `f` on each direct sub-expression, entering nested containers.
    /// Variables report their structural children and all branch terms.
    fn for_each_child<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        match self {
            ExprKind::Binary { left, right, .. } => {
                left.for_each_expr(f);
                right.for_each_expr(f);
            }
            ExprKind::Unary { operand, .. } => operand.for_each_expr(f),
            ExprKind::FunctionCall { args, kwargs, .. } => {
                slots(args, kwargs, f);
            }
            ExprKind::ItemAccess { base, key } => {
                base.for_each_expr(f);
                key.for_each_expr(f);
            }
            ExprKind::AttributeAccess { base, .. } => base.for_each_expr(f),
            ExprKind::ExprCall {
                callee,
                args,
                kwargs,
            } => {
                callee.for_each_expr(f);
                slots(args, kwargs, f);
            }
            ExprKind::Object(_) => {}
            ExprKind::Var(v) => {
                for child in v.structural_children() {
                    f(child);
                }
                for term in v.branches() {
                    term.for_each_expr(f);
                }
            }
        }
    }
}

fn slots<'a>(args: &'a [Term], kwargs: &'a [(String, Term)], f: &mut impl FnMut(&'a Expr)) {
    for t in args {
        t.for_each_expr(f);
    }
    for (_, t) in kwargs {
        t.for_each_expr(f);
    }
}

struct Discovery {
    seen: HashSet<VarId>,
    out: Vec<Expr>,
    into_branches: bool,
}

impl Discovery {
    fn new(into_branches: bool) -> Self {
        Self {
            seen: HashSet::new(),
            out: Vec::new(),
            into_branches,
        }
    }

    fn visit(&mut self, expr: &Expr) {
        let Some(var) = expr.as_var() else {
            expr.kind().for_each_child(&mut |child| self.visit(child));
            return;
        };
        if !self.seen.insert(var.id().clone()) {
            return;
        }
        self.out.push(expr.clone());
        for child in var.structural_children() {
            self.visit(child);
        }
        if self.into_branches {
            for term in var.branches() {
                term.for_each_expr(&mut |child| self.visit(child));
            }
        }
    }
}

impl Expr {
    /// Every reachable variable, once per id, in first-visit order.
    ///
    /// A variable is listed before its count or bound variables, which come
    /// before the variables of its branches.
    #[must_use]
    pub fn variables(&self) -> Vec<Expr> {
        let mut d = Discovery::new(true);
        d.visit(self);
        d.out
    }

    /// The variables active regardless of any list's choice: same walk as
    /// [`Expr::variables`] without entering list branches.
    #[must_use]
    pub fn choices(&self) -> Vec<Expr> {
        let mut d = Discovery::new(false);
        d.visit(self);
        d.out
    }

    /// Binds every reachable variable from `bindings`.
    ///
    /// Variables inside unselected list branches are not visited, so their
    /// ids may be absent from the map.
    ///
    /// # Errors
    ///
    /// Returns the first binding error encountered; see [`Variable::freeze`].
    pub fn freeze(&self, bindings: &Bindings) -> Result<()> {
        if let Some(var) = self.as_var() {
            return var.freeze(bindings);
        }
        let mut result = Ok(());
        self.kind().for_each_child(&mut |child| {
            if result.is_ok() {
                result = child.freeze(bindings);
            }
        });
        result
    }

    /// Consumes the handle, freezes it and returns it.
    ///
    /// # Errors
    ///
    /// See [`Expr::freeze`].
    pub fn frozen(self, bindings: &Bindings) -> Result<Self> {
        self.freeze(bindings)?;
        Ok(self)
    }

    /// Copies every node; constants stay shared.
    ///
    /// Each path is copied separately, so a node reachable twice becomes two
    /// nodes with the same variable ids.
    #[must_use]
    pub fn clone_shallow(&self) -> Expr {
        Cloner::shallow().expr(self)
    }

    /// Copies every node and constant. A node reachable through several
    /// paths is copied once and stays shared in the copy.
    #[must_use]
    pub fn clone_deep(&self) -> Expr {
        Cloner::deep().expr(self)
    }

    /// [`Expr::clone_deep`] if `deep`, otherwise [`Expr::clone_shallow`].
    #[must_use]
    pub fn clone_tree(&self, deep: bool) -> Expr {
        if deep { self.clone_deep() } else { self.clone_shallow() }
    }
}

impl Term {
    /// Every reachable variable in the slot; see [`Expr::variables`].
    #[must_use]
    pub fn variables(&self) -> Vec<Expr> {
        let mut d = Discovery::new(true);
        self.for_each_expr(&mut |e| d.visit(e));
        d.out
    }

    /// Active-root variables in the slot; see [`Expr::choices`].
    #[must_use]
    pub fn choices(&self) -> Vec<Expr> {
        let mut d = Discovery::new(false);
        self.for_each_expr(&mut |e| d.visit(e));
        d.out
    }

    /// Freezes every expression in the slot.
    ///
    /// # Errors
    ///
    /// See [`Expr::freeze`].
    pub fn freeze(&self, bindings: &Bindings) -> Result<()> {
        let mut result = Ok(());
        self.for_each_expr(&mut |e| {
            if result.is_ok() {
                result = e.freeze(bindings);
            }
        });
        result
    }
}

/// Structural copier. A deep copy threads a memo keyed by node address.
struct Cloner {
    memo: Option<HashMap<usize, Expr>>,
}

impl Cloner {
    fn shallow() -> Self {
        Self { memo: None }
    }

    fn deep() -> Self {
        Self {
            memo: Some(HashMap::new()),
        }
    }

    fn expr(&mut self, e: &Expr) -> Expr {
        if let Some(copy) = self.memo.as_ref().and_then(|m| m.get(&e.node_addr())) {
            return copy.clone();
        }
        let copy = Expr::from_kind(self.kind(e.kind()));
        if let Some(memo) = self.memo.as_mut() {
            // The original stays alive for the whole copy, so its address is
            // not reused.
            memo.insert(e.node_addr(), copy.clone());
        }
        copy
    }

    fn term(&mut self, t: &Term) -> Term {
        match t {
            Term::Const(v) if self.memo.is_some() => Term::Const(Arc::new((**v).clone())),
            Term::Const(v) => Term::Const(Arc::clone(v)),
            Term::Expr(e) => Term::Expr(self.expr(e)),
            Term::Seq(items) => Term::Seq(items.iter().map(|i| self.term(i)).collect()),
            Term::Map(entries) => Term::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.term(v)))
                    .collect(),
            ),
        }
    }

    fn terms(&mut self, ts: &[Term]) -> Vec<Term> {
        ts.iter().map(|t| self.term(t)).collect()
    }

    fn kwargs(&mut self, kw: &[(String, Term)]) -> Vec<(String, Term)> {
        kw.iter().map(|(k, t)| (k.clone(), self.term(t))).collect()
    }

    fn kind(&mut self, kind: &ExprKind) -> ExprKind {
        match kind {
            ExprKind::Binary { op, left, right } => ExprKind::Binary {
                op: *op,
                left: self.term(left),
                right: self.term(right),
            },
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op: *op,
                operand: self.term(operand),
            },
            ExprKind::FunctionCall {
                target,
                args,
                kwargs,
            } => ExprKind::FunctionCall {
                target: target.clone(),
                args: self.terms(args),
                kwargs: self.kwargs(kwargs),
            },
            ExprKind::ItemAccess { base, key } => ExprKind::ItemAccess {
                base: self.term(base),
                key: self.term(key),
            },
            ExprKind::AttributeAccess { base, name } => ExprKind::AttributeAccess {
                base: self.term(base),
                name: name.clone(),
            },
            ExprKind::ExprCall {
                callee,
                args,
                kwargs,
            } => ExprKind::ExprCall {
                callee: self.term(callee),
                args: self.terms(args),
                kwargs: self.kwargs(kwargs),
            },
            ExprKind::Object(target) => ExprKind::Object(target.clone()),
            ExprKind::Var(v) => ExprKind::Var(self.variable(v)),
        }
    }

    fn variable(&mut self, v: &Variable) -> Variable {
        let kind = match &v.kind {
            VarKind::List(spec) => VarKind::List(ListSpec {
                values: self.terms(&spec.values),
                k: spec.k.as_ref().map(|k| match k {
                    Count::Fixed(n) => Count::Fixed(*n),
                    Count::Var(e) => Count::Var(self.expr(e)),
                }),
                replace: spec.replace,
                invariant: spec.invariant,
            }),
            VarKind::Int(spec) => VarKind::Int(self.range(spec)),
            VarKind::Float(spec) => VarKind::Float(self.range(spec)),
        };
        Variable {
            id: v.id.clone(),
            kind,
            bound: RwLock::new(v.bound()),
        }
    }

    fn range<T: Clone>(&mut self, spec: &RangeSpec<T>) -> RangeSpec<T> {
        RangeSpec {
            low: self.limit(&spec.low),
            high: self.limit(&spec.high),
            log_scale: spec.log_scale,
            distribution: spec.distribution.clone(),
        }
    }

    fn limit<T: Clone>(&mut self, limit: &Limit<T>) -> Limit<T> {
        match limit {
            Limit::Fixed(v) => Limit::Fixed(v.clone()),
            Limit::Var(e) => Limit::Var(self.expr(e)),
        }
    }
}
