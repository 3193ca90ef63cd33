//! Model-checking queries: the property operators of `check_expression`,
//! the argument checks of the statistical queries and the well-formedness
//! rules applied to whole properties.

use tracing::debug;

use crate::{
    ast::{
        expressions::{ExprKind, Expression},
        types::{Type, TypeKind},
    },
    errors::errors::ErrorImpl,
};

use super::{
    expressions::{
        is_clock, is_constant_double, is_constant_integer, is_constraint, is_diff, is_double_value,
        is_formula, is_integer, is_integral,
    },
    type_checker::TypeChecker,
};

fn formula() -> Type {
    Type::primitive(TypeKind::Formula)
}

fn tio_graph() -> Type {
    Type::primitive(TypeKind::TioGraph)
}

fn is_process_id(expr: &Expression) -> bool {
    expr.is(ExprKind::Identifier) && expr.get_type().is(TypeKind::Process)
}

fn is_process_graph(expr: &Expression) -> bool {
    expr.get_type().is(TypeKind::TioGraph) || is_process_id(expr)
}

fn is_list_of_formulas(expr: &Expression) -> bool {
    expr.is(ExprKind::List) && expr.children().iter().all(is_formula)
}

/// A list of identifiers whose types are all of `kind`.
fn is_id_list(expr: &Expression, kind: TypeKind) -> bool {
    expr.is(ExprKind::List)
        && expr
            .children()
            .iter()
            .all(|id| id.is(ExprKind::Identifier) && id.get_type().is(kind))
}

/// Controller synthesis, refinement and the other game queries may nest
/// path quantifiers freely.
fn is_game_property(expr: &Expression) -> bool {
    matches!(
        expr.kind(),
        Some(
            ExprKind::Control
                | ExprKind::SmcControl
                | ExprKind::EFControl
                | ExprKind::ControlTopt
                | ExprKind::PoControl
                | ExprKind::ControlToptDef1
                | ExprKind::ControlToptDef2
                | ExprKind::SimulationLe
                | ExprKind::SimulationGe
                | ExprKind::RefinementLe
                | ExprKind::RefinementGe
                | ExprKind::Consistency
                | ExprKind::Implementation
                | ExprKind::Specification
        )
    )
}

/// Statistical and scenario queries whose arguments were already checked
/// slot by slot.
fn has_own_argument_checks(expr: &Expression) -> bool {
    matches!(
        expr.kind(),
        Some(
            ExprKind::SupVar
                | ExprKind::InfVar
                | ExprKind::Scenario
                | ExprKind::ProbaMinBox
                | ExprKind::ProbaMinDiamond
                | ExprKind::ProbaBox
                | ExprKind::ProbaDiamond
                | ExprKind::ProbaExp
                | ExprKind::ProbaCmp
                | ExprKind::Simulate
                | ExprKind::SimulateReach
                | ExprKind::MitlFormula
        )
    )
}

fn has_mitl_in_quantified_sub(expr: &Expression) -> bool {
    expr.is(ExprKind::MitlForall)
        || expr.is(ExprKind::MitlExists)
        || expr.children().iter().any(has_mitl_in_quantified_sub)
}

impl TypeChecker<'_> {
    pub(super) fn is_query_kind(kind: ExprKind) -> bool {
        matches!(
            kind,
            ExprKind::EF
                | ExprKind::EG
                | ExprKind::AF
                | ExprKind::AG
                | ExprKind::EFReach
                | ExprKind::AGReach
                | ExprKind::EFControl
                | ExprKind::Control
                | ExprKind::ControlTopt
                | ExprKind::ControlToptDef1
                | ExprKind::ControlToptDef2
                | ExprKind::PMax
                | ExprKind::PoControl
                | ExprKind::Restrict
                | ExprKind::SimulationLe
                | ExprKind::SimulationGe
                | ExprKind::TioQuotient
                | ExprKind::Consistency
                | ExprKind::Specification
                | ExprKind::Implementation
                | ExprKind::TioComposition
                | ExprKind::TioConjunction
                | ExprKind::SyntaxComposition
                | ExprKind::RefinementLe
                | ExprKind::RefinementGe
                | ExprKind::Leadsto
                | ExprKind::Scenario2
                | ExprKind::AUntil
                | ExprKind::AWeakUntil
                | ExprKind::ABuchi
                | ExprKind::Scenario
                | ExprKind::Simulate
                | ExprKind::SimulateReach
                | ExprKind::SupVar
                | ExprKind::InfVar
                | ExprKind::MitlFormula
                | ExprKind::MitlConj
                | ExprKind::MitlDisj
                | ExprKind::MitlNext
                | ExprKind::MitlUntil
                | ExprKind::MitlRelease
                | ExprKind::MitlAtom
                | ExprKind::SmcControl
                | ExprKind::ProbaMinBox
                | ExprKind::ProbaMinDiamond
                | ExprKind::ProbaBox
                | ExprKind::ProbaDiamond
                | ExprKind::ProbaCmp
                | ExprKind::ProbaExp
        )
    }

    /// Types a query operator whose operands are already checked. Returns
    /// `None` when an error was reported, and the unknown type when no rule
    /// applies so that the caller reports a type error.
    pub(super) fn check_query_expression(&self, expr: &Expression, kind: ExprKind) -> Option<Type> {
        let first = expr.get(0);
        let second = expr.get(1);

        let ty = match kind {
            ExprKind::EF
            | ExprKind::EG
            | ExprKind::AF
            | ExprKind::AG
            | ExprKind::EFReach
            | ExprKind::AGReach
            | ExprKind::EFControl
            | ExprKind::Control
            | ExprKind::ControlTopt
            | ExprKind::ControlToptDef1
            | ExprKind::ControlToptDef2
            | ExprKind::PMax => {
                if is_formula(&first) {
                    formula()
                } else {
                    Type::unknown()
                }
            }

            ExprKind::PoControl => {
                if is_list_of_formulas(&first) && is_formula(&second) {
                    formula()
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Restrict => {
                let mut ok = true;
                if !is_id_list(&first, TypeKind::Process) {
                    self.handle_error(&first, ErrorImpl::Expected { what: "composition of processes" });
                    ok = false;
                }
                if !is_id_list(&second, TypeKind::Channel) {
                    self.handle_error(&second, ErrorImpl::Expected { what: "list of channels" });
                    ok = false;
                }
                if !ok {
                    return None;
                }
                formula()
            }

            ExprKind::SimulationLe | ExprKind::SimulationGe => {
                let (restricted, processes) = if kind == ExprKind::SimulationLe {
                    (&first, &second)
                } else {
                    (&second, &first)
                };
                let mut ok = true;
                if !restricted.is(ExprKind::Restrict) {
                    self.handle_error(restricted, ErrorImpl::Expected { what: "composition of processes" });
                    ok = false;
                }
                if !is_id_list(processes, TypeKind::Process) {
                    self.handle_error(processes, ErrorImpl::Expected { what: "composition of processes" });
                    ok = false;
                }
                if !ok {
                    return None;
                }
                formula()
            }

            ExprKind::TioQuotient => {
                let mut ok = true;
                for operand in [&first, &second] {
                    if !is_process_graph(operand) {
                        self.handle_error(operand, ErrorImpl::Expected { what: "process expression" });
                        ok = false;
                    }
                }
                if !ok {
                    return None;
                }
                tio_graph()
            }

            ExprKind::Consistency => {
                let mut ok = true;
                if !is_process_graph(&first) {
                    self.handle_error(&first, ErrorImpl::Expected { what: "process expression" });
                    ok = false;
                }
                if !is_formula(&second) {
                    self.handle_error(&second, ErrorImpl::InvalidFormula);
                    ok = false;
                }
                if !ok {
                    return None;
                }
                tio_graph()
            }

            ExprKind::Specification | ExprKind::Implementation => {
                if !is_process_graph(&first) {
                    self.handle_error(&first, ErrorImpl::Expected { what: "process expression" });
                    return None;
                }
                formula()
            }

            ExprKind::TioComposition | ExprKind::TioConjunction | ExprKind::SyntaxComposition => {
                let mut ok = true;
                for operand in expr.children() {
                    if !operand.get_type().is(TypeKind::TioGraph) && !operand.is(ExprKind::Identifier) {
                        self.handle_error(operand, ErrorImpl::Expected { what: "process expression" });
                        ok = false;
                    }
                }
                if !ok {
                    return None;
                }
                tio_graph()
            }

            ExprKind::RefinementLe | ExprKind::RefinementGe => {
                let mut ok = true;
                for operand in [&first, &second] {
                    if !operand.get_type().is(TypeKind::TioGraph) && !operand.is(ExprKind::Identifier) {
                        self.handle_error(operand, ErrorImpl::Expected { what: "process expression" });
                        ok = false;
                    }
                }
                if !ok {
                    return None;
                }
                formula()
            }

            ExprKind::Leadsto
            | ExprKind::Scenario2
            | ExprKind::AUntil
            | ExprKind::AWeakUntil
            | ExprKind::ABuchi => {
                if is_formula(&first) && is_formula(&second) {
                    formula()
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Scenario => formula(),

            ExprKind::Simulate | ExprKind::SimulateReach => {
                let mut ok = self.check_nr_of_runs(&first);
                if ok && first.value() <= 0 {
                    self.handle_error(&first, ErrorImpl::InvalidRunCount);
                    ok = false;
                }
                ok &= self.check_bound_type_or_bounded_expr(&second);
                ok &= self.check_bound(&expr.get(2));
                if !ok {
                    return None;
                }

                let mut end = expr.size();
                if kind == ExprKind::SimulateReach {
                    // The reach predicate and the number of hits close the list.
                    end = end.saturating_sub(2);
                    let ok = self.check_predicate(&expr.get(end)) & self.check_nr_of_runs(&expr.get(end + 1));
                    if !ok {
                        return None;
                    }
                }
                for i in 3..end {
                    if !self.check_monitored_expr(&expr.get(i)) {
                        return None;
                    }
                }
                formula()
            }

            ExprKind::SupVar | ExprKind::InfVar => {
                if !is_integral(&first) && !is_constraint(&first) {
                    self.handle_error(&first, ErrorImpl::Expected { what: "boolean" });
                    return None;
                }
                if !second.is(ExprKind::List) {
                    return Some(Type::unknown());
                }
                for observed in second.children() {
                    if is_integral(observed) {
                        if observed.changes_any_variable() {
                            self.handle_error(observed, ErrorImpl::MustBeSideEffectFree { subject: "expression" });
                            return None;
                        }
                    } else if !is_clock(observed) {
                        self.handle_error(observed, ErrorImpl::TypeError);
                        return None;
                    }
                }
                formula()
            }

            ExprKind::MitlFormula
            | ExprKind::MitlConj
            | ExprKind::MitlDisj
            | ExprKind::MitlNext
            | ExprKind::MitlUntil
            | ExprKind::MitlRelease
            | ExprKind::MitlAtom => formula(),

            ExprKind::SmcControl => {
                if expr.size() != 3 {
                    self.handle_error(expr, ErrorImpl::ArityBug);
                    return None;
                }
                let ok = self.check_bound_type_or_bounded_expr(&first) & self.check_bound(&second);
                if !ok {
                    return None;
                }
                if is_formula(&expr.get(2)) {
                    formula()
                } else {
                    Type::unknown()
                }
            }

            ExprKind::ProbaMinBox | ExprKind::ProbaMinDiamond => {
                if expr.size() != 5 {
                    self.handle_error(expr, ErrorImpl::ArityBug);
                    return None;
                }
                let mut ok = self.check_nr_of_runs(&first);
                if ok && first.value() > 0 {
                    self.handle_error(&first, ErrorImpl::ExplicitRunsNotSupported);
                    ok = false;
                }
                ok &= self.check_bound_type_or_bounded_expr(&second);
                ok &= self.check_bound(&expr.get(2));
                ok &= self.check_predicate(&expr.get(3));
                ok &= self.check_prob_bound(&expr.get(4));
                if !ok {
                    return None;
                }
                formula()
            }

            ExprKind::ProbaBox | ExprKind::ProbaDiamond => {
                if expr.size() != 5 {
                    self.handle_error(expr, ErrorImpl::ArityBug);
                    return None;
                }
                let ok = self.check_nr_of_runs(&first)
                    & self.check_bound_type_or_bounded_expr(&second)
                    & self.check_bound(&expr.get(2))
                    & self.check_predicate(&expr.get(3))
                    & self.check_until_cond(kind, &expr.get(4));
                if !ok {
                    return None;
                }
                formula()
            }

            ExprKind::ProbaCmp => {
                if expr.size() != 8 {
                    self.handle_error(expr, ErrorImpl::ArityBug);
                    return None;
                }
                // Two probabilities, four slots each.
                let mut ok = true;
                for offset in [0, 4] {
                    ok &= self.check_bound_type_or_bounded_expr(&expr.get(offset));
                    ok &= self.check_bound(&expr.get(offset + 1));
                    ok &= self.check_path_quant(&expr.get(offset + 2));
                    ok &= self.check_predicate(&expr.get(offset + 3));
                }
                if !ok {
                    return None;
                }
                formula()
            }

            ExprKind::ProbaExp => {
                if expr.size() != 5 {
                    self.handle_error(expr, ErrorImpl::ArityBug);
                    return None;
                }
                let ok = self.check_nr_of_runs(&first)
                    & self.check_bound_type_or_bounded_expr(&second)
                    & self.check_bound(&expr.get(2))
                    & self.check_aggregation_op(&expr.get(3))
                    & self.check_monitored_expr(&expr.get(4));
                if !ok {
                    return None;
                }
                formula()
            }

            _ => Type::unknown(),
        };
        Some(ty)
    }

    fn check_nr_of_runs(&self, runs: &Expression) -> bool {
        if !self.is_compile_time_computable(runs) {
            self.handle_error(runs, ErrorImpl::MustBeComputableAtCompileTime);
            return false;
        }
        if !is_constant_integer(runs) {
            self.handle_error(runs, ErrorImpl::Expected { what: "integer" });
            return false;
        }
        true
    }

    fn check_bound_type_or_bounded_expr(&self, bound_type: &Expression) -> bool {
        if !is_constant_integer(bound_type) && !is_clock(bound_type) {
            self.handle_error(bound_type, ErrorImpl::Expected { what: "clock" });
            return false;
        }
        true
    }

    fn check_bound(&self, bound: &Expression) -> bool {
        if !self.is_compile_time_computable(bound) {
            self.handle_error(bound, ErrorImpl::MustBeComputableAtCompileTime);
            return false;
        }
        if !is_integral(bound) {
            self.handle_error(bound, ErrorImpl::Expected { what: "integer" });
            return false;
        }
        true
    }

    fn check_predicate(&self, predicate: &Expression) -> bool {
        if !is_integral(predicate) && !is_constraint(predicate) {
            self.handle_error(predicate, ErrorImpl::Expected { what: "boolean" });
            return false;
        }
        if predicate.changes_any_variable() {
            self.handle_error(predicate, ErrorImpl::MustBeSideEffectFree { subject: "property" });
            return false;
        }
        true
    }

    fn check_prob_bound(&self, bound: &Expression) -> bool {
        if !is_constant_double(bound) {
            self.handle_error(bound, ErrorImpl::ProbabilityBoundExpected);
            return false;
        }
        true
    }

    /// A box query encodes its until-condition as constant false.
    fn check_until_cond(&self, kind: ExprKind, until: &Expression) -> bool {
        if kind == ExprKind::ProbaDiamond && !is_integral(until) && !is_constraint(until) {
            self.handle_error(until, ErrorImpl::Expected { what: "boolean" });
            return false;
        }
        if kind == ExprKind::ProbaBox
            && until.is(ExprKind::Constant)
            && is_integral(until)
            && until.value() != 0
        {
            self.handle_error(until, ErrorImpl::MustBeFalse);
            return false;
        }
        true
    }

    fn check_monitored_expr(&self, monitored: &Expression) -> bool {
        let accepted = is_integral(monitored)
            || is_clock(monitored)
            || is_double_value(monitored)
            || monitored.get_type().is(TypeKind::DoubleInvGuard)
            || is_constraint(monitored);
        if !accepted {
            self.handle_error(monitored, ErrorImpl::Expected { what: "integer or clock" });
            return false;
        }
        if monitored.changes_any_variable() {
            self.handle_error(monitored, ErrorImpl::MustBeSideEffectFree { subject: "property" });
            return false;
        }
        true
    }

    fn check_path_quant(&self, quantifier: &Expression) -> bool {
        if !is_constant_integer(quantifier) {
            self.handle_error(quantifier, ErrorImpl::BadPathQuantifier);
            return false;
        }
        true
    }

    fn check_aggregation_op(&self, operator: &Expression) -> bool {
        if !is_constant_integer(operator) || operator.value() > 1 {
            self.handle_error(operator, ErrorImpl::BadAggregationOperator);
            return false;
        }
        true
    }

    /// Rules for a complete query on top of its expression type.
    pub(super) fn check_property(&self, property: &Expression) {
        debug!(%property, "checking property");
        if !self.check_expression(property) {
            return;
        }

        if property.changes_any_variable() {
            self.handle_error(property, ErrorImpl::MustBeSideEffectFree { subject: "property" });
        }
        let consistency = property.is(ExprKind::Consistency) && property.get_type().is(TypeKind::TioGraph);
        if !consistency && !is_formula(property) {
            self.handle_error(property, ErrorImpl::InvalidFormula);
        }

        if !is_game_property(property) && !has_own_argument_checks(property) {
            for sub in property.children() {
                if !is_constraint(sub) {
                    self.handle_error(sub, ErrorImpl::NestedPathQuantifiers);
                }
            }
        }

        if property.is(ExprKind::PoControl) {
            self.check_observation_constraints(property);
        }

        if has_mitl_in_quantified_sub(property) && !property.is(ExprKind::MitlFormula) {
            self.handle_error(property, ErrorImpl::QuantifiedMitlOutsideMitl);
        }
    }

    /// Observations may only use weak lower and strict upper clock bounds,
    /// and never clock differences.
    fn check_observation_constraints(&self, expr: &Expression) {
        for sub in expr.children() {
            self.check_observation_constraints(sub);
        }

        let (left, right) = (expr.get(0), expr.get(1));
        let invalid = match expr.kind() {
            Some(ExprKind::Lt | ExprKind::Ge) => is_integral(&left) && is_clock(&right),
            Some(ExprKind::Le | ExprKind::Gt) => is_clock(&left) && is_integral(&right),
            Some(ExprKind::Eq | ExprKind::Neq) => {
                (is_clock(&left) && is_integral(&right)) || (is_integral(&left) && is_clock(&right))
            }
            _ => false,
        };

        if invalid {
            self.handle_error(expr, ErrorImpl::ObservationBounds);
            return;
        }

        let comparison = matches!(
            expr.kind(),
            Some(ExprKind::Lt | ExprKind::Le | ExprKind::Gt | ExprKind::Ge | ExprKind::Eq | ExprKind::Neq)
        );
        if comparison
            && ((is_clock(&left) && is_clock(&right))
                || (is_diff(&left) && is_integer(&right))
                || (is_integer(&left) && is_diff(&right)))
        {
            self.handle_error(expr, ErrorImpl::ClockDifferencesNotSupported);
        }
    }
}
