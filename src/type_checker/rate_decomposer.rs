use tracing::warn;

use crate::ast::{
    expressions::{ExprKind, Expression},
    types::{Type, TypeKind},
};

/// Splits a checked location invariant into the clock invariant proper and
/// an optional cost rate.
#[derive(Debug)]
pub struct RateDecomposer {
    pub invariant: Expression,
    pub cost_rate: Expression,
    pub has_strict_invariant: bool,
    pub has_clock_rates: bool,
    pub count_cost_rates: usize,
}

impl Default for RateDecomposer {
    fn default() -> Self {
        RateDecomposer {
            invariant: Expression::constant(1),
            cost_rate: Expression::empty(),
            has_strict_invariant: false,
            has_clock_rates: false,
            count_cost_rates: 0,
        }
    }
}

impl RateDecomposer {
    pub fn new() -> Self {
        RateDecomposer::default()
    }

    /// `expr` must already be typed as an invariant, possibly with rates.
    pub fn decompose(&mut self, expr: &Expression) {
        self.decompose_in(expr, false);
    }

    fn decompose_in(&mut self, expr: &Expression, in_forall: bool) {
        if expr.get_type().is_invariant() {
            // Strict upper bounds only.
            if expr.is(ExprKind::Lt) {
                self.has_strict_invariant = true;
            }
            if !in_forall {
                self.conjoin(expr, TypeKind::Invariant);
            }
        } else if expr.is(ExprKind::And) {
            self.decompose_in(&expr.get(0), in_forall);
            self.decompose_in(&expr.get(1), in_forall);
        } else if expr.is(ExprKind::Eq) {
            let (rate, value) = if expr.get(0).get_type().is(TypeKind::Rate) {
                (expr.get(0).get(0), expr.get(1))
            } else {
                (expr.get(1).get(0), expr.get(0))
            };

            if rate.get_type().is_cost() {
                self.cost_rate = value;
                self.count_cost_rates += 1;
            } else {
                self.has_clock_rates = true;
                if !in_forall {
                    self.conjoin(expr, TypeKind::InvariantWeak);
                }
            }
        } else {
            if !expr.is(ExprKind::Forall) {
                warn!(%expr, "unexpected shape of invariant with rates");
            }
            // Look for clock rates inside the quantifier but keep the
            // quantified expression whole.
            self.decompose_in(&expr.get(1), true);
            self.conjoin(expr, TypeKind::InvariantWeak);
        }
    }

    fn conjoin(&mut self, expr: &Expression, kind: TypeKind) {
        self.invariant = if self.invariant.is_true() {
            expr.clone()
        } else {
            Expression::typed(
                ExprKind::And,
                vec![self.invariant.clone(), expr.clone()],
                Type::primitive(kind),
            )
            .at(expr.position())
        };
    }
}
