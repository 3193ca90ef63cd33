use crate::{
    ast::{
        expressions::{ExprKind, Expression, MathFunction},
        types::{Type, TypeKind},
    },
    errors::errors::ErrorImpl,
};

use super::{
    compatibility::{
        are_assignment_compatible, are_eq_compatible, are_inline_if_compatible, is_assignable,
        is_modifiable_lvalue, is_same_scalar_type,
    },
    type_checker::TypeChecker,
};

pub(super) fn is_integral(expr: &Expression) -> bool {
    expr.get_type().is_integral()
}

pub(super) fn is_integer(expr: &Expression) -> bool {
    expr.get_type().is_integer()
}

pub(super) fn is_clock(expr: &Expression) -> bool {
    expr.get_type().is_clock()
}

pub(super) fn is_diff(expr: &Expression) -> bool {
    expr.get_type().is_diff()
}

pub(super) fn is_double(expr: &Expression) -> bool {
    expr.get_type().is_double()
}

/// Doubles, clocks and clock differences all evaluate to a real number.
pub(super) fn is_double_value(expr: &Expression) -> bool {
    is_double(expr) || is_clock(expr) || is_diff(expr)
}

pub(super) fn is_number(expr: &Expression) -> bool {
    is_double_value(expr) || is_integral(expr)
}

/// Bounds of clock constraints: integers and doubles.
pub(super) fn is_bound(expr: &Expression) -> bool {
    is_integer(expr) || is_double(expr)
}

pub(super) fn is_invariant(expr: &Expression) -> bool {
    expr.get_type().is_invariant()
}

pub(super) fn is_invariant_wr(expr: &Expression) -> bool {
    expr.get_type().is_invariant_wr()
}

pub(super) fn is_guard(expr: &Expression) -> bool {
    expr.get_type().is_guard()
}

pub(super) fn is_constraint(expr: &Expression) -> bool {
    expr.get_type().is_constraint()
}

pub(super) fn is_formula(expr: &Expression) -> bool {
    expr.get_type().is_formula()
}

pub(super) fn is_constant_integer(expr: &Expression) -> bool {
    expr.is(ExprKind::Constant) && is_integer(expr)
}

pub(super) fn is_constant_double(expr: &Expression) -> bool {
    expr.is(ExprKind::Constant) && is_double(expr)
}

/// Clock against clock or integer, and clock difference against integer.
fn clock_comparison(left: &Expression, right: &Expression) -> bool {
    (is_clock(left) && is_clock(right))
        || (is_clock(left) && is_integer(right))
        || (is_integer(left) && is_clock(right))
        || (is_diff(left) && is_integer(right))
        || (is_integer(left) && is_diff(right))
}

fn primitive(kind: TypeKind) -> Type {
    Type::primitive(kind)
}

impl TypeChecker<'_> {
    /// Infers the type of `expr` bottom up and stores it in the node.
    /// Returns false when a diagnostic was reported for `expr` or one of
    /// its sub-expressions; the type of a failed node is left untouched.
    /// Leaves (identifiers, constants, lists, record accesses) keep the
    /// type they were built with.
    pub fn check_expression(&self, expr: &Expression) -> bool {
        let Some(kind) = expr.kind() else {
            return true;
        };

        let mut ok = true;
        for child in expr.children() {
            ok &= self.check_expression(child);
        }
        if !ok {
            return false;
        }

        let left = expr.get(0);
        let right = expr.get(1);

        let ty = match kind {
            ExprKind::Fraction => {
                if is_integral(&left) && is_integral(&right) {
                    primitive(TypeKind::Fraction)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Plus => {
                if is_integral(&left) && is_integral(&right) {
                    primitive(TypeKind::Int)
                } else if (is_integer(&left) && is_clock(&right))
                    || (is_clock(&left) && is_integer(&right))
                {
                    primitive(TypeKind::Clock)
                } else if (is_diff(&left) && is_integer(&right))
                    || (is_integer(&left) && is_diff(&right))
                {
                    primitive(TypeKind::Diff)
                } else if is_number(&left) && is_number(&right) {
                    primitive(TypeKind::Double)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Minus => {
                if is_integral(&left) && is_integral(&right) {
                    primitive(TypeKind::Int)
                } else if is_clock(&left) && is_integer(&right) {
                    // The negation of a clock is not a clock.
                    primitive(TypeKind::Clock)
                } else if (is_diff(&left) && is_integer(&right))
                    || (is_integer(&left) && is_diff(&right))
                    || (is_clock(&left) && is_clock(&right))
                {
                    primitive(TypeKind::Diff)
                } else if is_number(&left) && is_number(&right) {
                    primitive(TypeKind::Double)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::And => self.classify_conjunction(&left, &right),

            ExprKind::Or => {
                let mixed = |accepted: fn(&Expression) -> bool| {
                    (is_integral(&left) && accepted(&right)) || (accepted(&left) && is_integral(&right))
                };
                if is_integral(&left) && is_integral(&right) {
                    primitive(TypeKind::Bool)
                } else if mixed(is_invariant) {
                    primitive(TypeKind::Invariant)
                } else if mixed(is_invariant_wr) {
                    primitive(TypeKind::InvariantWeak)
                } else if mixed(is_guard) {
                    primitive(TypeKind::Guard)
                } else if is_constraint(&left) && is_constraint(&right) {
                    primitive(TypeKind::Constraint)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Xor => {
                if is_integral(&left) && is_integral(&right) {
                    primitive(TypeKind::Bool)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Spawn => {
                let template = left
                    .get_symbol()
                    .and_then(|symbol| self.system.get_dynamic_template(symbol.name()));
                let Some(template) = template else {
                    self.handle_error(expr, ErrorImpl::SpawnOfStaticTemplate);
                    return false;
                };

                let received = expr.size().saturating_sub(1);
                if template.parameters.len() != received {
                    self.handle_error(
                        expr,
                        ErrorImpl::WrongNumberOfArguments {
                            expected: template.parameters.len(),
                            received,
                        },
                    );
                    return false;
                }
                for (i, parameter) in template.parameters.iter().enumerate() {
                    if !self.check_parameter_compatible(&parameter.get_type(), &expr.get(i + 1)) {
                        return false;
                    }
                }
                if !template.is_defined {
                    self.handle_error(expr, ErrorImpl::TemplateOnlyDeclared);
                    return false;
                }
                primitive(TypeKind::Int)
            }

            ExprKind::NumOf => {
                let template = left
                    .get_symbol()
                    .and_then(|symbol| self.system.get_dynamic_template(symbol.name()));
                if template.is_none() {
                    self.handle_error(expr, ErrorImpl::NotADynamicTemplate);
                    return false;
                }
                primitive(TypeKind::Int)
            }

            ExprKind::Exit => match self.template_dynamic {
                None => {
                    self.handle_error(
                        expr,
                        ErrorImpl::Internal {
                            message: String::from("exit checked outside of a template"),
                        },
                    );
                    return false;
                }
                Some(false) => {
                    self.handle_error(expr, ErrorImpl::ExitInStaticTemplate);
                    return false;
                }
                Some(true) => primitive(TypeKind::Int),
            },

            ExprKind::SumDynamic => {
                let body = expr.get(2);
                if is_integral(&body) || is_double_value(&body) {
                    body.get_type()
                } else if is_invariant(&body) || is_guard(&body) {
                    primitive(TypeKind::DoubleInvGuard)
                } else {
                    self.handle_error(expr, ErrorImpl::InvalidSumBody);
                    return false;
                }
            }

            ExprKind::Lt | ExprKind::Le | ExprKind::Gt | ExprKind::Ge => {
                if is_integral(&left) && is_integral(&right) {
                    primitive(TypeKind::Bool)
                } else if (is_clock(&left) && is_clock(&right))
                    || (is_clock(&left) && is_bound(&right))
                    || (is_bound(&left) && is_clock(&right))
                    || (is_diff(&left) && is_bound(&right))
                    || (is_bound(&left) && is_diff(&right))
                {
                    primitive(TypeKind::Invariant)
                } else if is_number(&left) && is_number(&right) {
                    primitive(TypeKind::Bool)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Eq => {
                let rate_equation = |rate: &Expression, value: &Expression| {
                    rate.get_type().is(TypeKind::Rate) && (is_integral(value) || is_double_value(value))
                };
                if clock_comparison(&left, &right) {
                    primitive(TypeKind::Guard)
                } else if are_eq_compatible(&left.get_type(), &right.get_type()) {
                    primitive(TypeKind::Bool)
                } else if rate_equation(&left, &right) || rate_equation(&right, &left) {
                    primitive(TypeKind::InvariantWeak)
                } else if is_number(&left) && is_number(&right) {
                    primitive(TypeKind::Bool)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Neq => {
                if are_eq_compatible(&left.get_type(), &right.get_type()) {
                    primitive(TypeKind::Bool)
                } else if clock_comparison(&left, &right) {
                    primitive(TypeKind::Constraint)
                } else if is_number(&left) && is_number(&right) {
                    primitive(TypeKind::Bool)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Mult
            | ExprKind::Div
            | ExprKind::Min
            | ExprKind::Max => {
                if is_integral(&left) && is_integral(&right) {
                    primitive(TypeKind::Int)
                } else if is_number(&left) && is_number(&right) {
                    primitive(TypeKind::Double)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Mod
            | ExprKind::BitAnd
            | ExprKind::BitOr
            | ExprKind::BitXor
            | ExprKind::BitLShift
            | ExprKind::BitRShift => {
                if is_integral(&left) && is_integral(&right) {
                    primitive(TypeKind::Int)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Not => {
                if is_integral(&left) {
                    primitive(TypeKind::Bool)
                } else if is_constraint(&left) {
                    primitive(TypeKind::Constraint)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::UnaryMinus => {
                if is_integral(&left) {
                    primitive(TypeKind::Int)
                } else if is_number(&left) {
                    primitive(TypeKind::Double)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Rate => {
                if is_clock(&left) || left.get_type().is_cost() {
                    primitive(TypeKind::Rate)
                } else {
                    Type::unknown()
                }
            }

            ExprKind::Assign => {
                if !are_assignment_compatible(&left.get_type(), &right.get_type(), false) {
                    self.handle_error(expr, ErrorImpl::IncompatibleTypes);
                    return false;
                }
                if !is_modifiable_lvalue(&left) {
                    self.handle_error(&left, ErrorImpl::LeftHandSideValueExpected);
                    return false;
                }
                left.get_type()
            }

            ExprKind::AssPlus => {
                if (!is_integer(&left) && !left.get_type().is_cost()) || !is_integral(&right) {
                    self.handle_error(expr, ErrorImpl::IncrementOperatorNotAllowed);
                    return false;
                }
                if !is_modifiable_lvalue(&left) {
                    self.handle_error(&left, ErrorImpl::LeftHandSideValueExpected);
                    return false;
                }
                left.get_type()
            }

            kind if kind.is_assignment() => {
                if !is_integral(&left) || !is_integral(&right) {
                    self.handle_error(expr, ErrorImpl::NonIntegerCompoundAssignment);
                    return false;
                }
                if !is_modifiable_lvalue(&left) {
                    self.handle_error(&left, ErrorImpl::LeftHandSideValueExpected);
                    return false;
                }
                left.get_type()
            }

            kind if kind.is_increment() => {
                if !is_modifiable_lvalue(&left) {
                    self.handle_error(&left, ErrorImpl::LeftHandSideValueExpected);
                    return false;
                }
                if !is_integer(&left) {
                    self.handle_error(expr, ErrorImpl::Expected { what: "integer" });
                    return false;
                }
                primitive(TypeKind::Int)
            }

            ExprKind::Math(function) => match self.check_math_function(expr, function) {
                Some(ty) => ty,
                None => return false,
            },

            ExprKind::InlineIf => {
                let (then, otherwise) = (right, expr.get(2));
                if !is_integral(&left) {
                    self.handle_error(expr, ErrorImpl::InlineIfConditionNotInteger);
                    return false;
                }
                if !are_inline_if_compatible(&then.get_type(), &otherwise.get_type()) {
                    self.handle_error(expr, ErrorImpl::IncompatibleArgumentsToInlineIf);
                    return false;
                }
                then.get_type()
            }

            ExprKind::Comma => {
                for operand in [&left, &right] {
                    if !operand.get_type().is_void() && !is_assignable(&operand.get_type()) {
                        self.handle_error(operand, ErrorImpl::IncompatibleTypeForCommaExpression);
                        return false;
                    }
                }
                // Already typed means the warning went out with the first check.
                if expr.get_type().is_unknown() {
                    self.check_ignored_value(&left);
                }
                right.get_type()
            }

            ExprKind::FunCall => {
                // The callee's type lists the result first, then the parameters.
                let callee = left.get_type();
                let mut result = true;
                for i in 1..callee.size() {
                    result &= self.check_parameter_compatible(&callee.get(i), &expr.get(i));
                }
                return result;
            }

            ExprKind::Array => {
                let array = left.get_type();
                let index = right.get_type();
                if !array.is_array() {
                    self.handle_error(&left, ErrorImpl::Expected { what: "array" });
                    return false;
                }

                let size = array.get_array_size();
                if size.is_integer() && index.is_integral() {
                    // Bounds are checked at runtime.
                } else if size.is_scalar() && index.is_scalar() {
                    if !is_same_scalar_type(&size, &index) {
                        self.handle_error(&right, ErrorImpl::IncompatibleType);
                        return false;
                    }
                } else {
                    self.handle_error(&right, ErrorImpl::IncompatibleType);
                    return false;
                }
                array.get_sub()
            }

            ExprKind::Forall | ExprKind::Exists => {
                if let Some(bound) = left.symbol() {
                    self.check_type(&bound.get_type());
                }
                let body = right;
                let forall = kind == ExprKind::Forall;
                let ty = if is_integral(&body) {
                    primitive(TypeKind::Bool)
                } else if forall && is_invariant(&body) {
                    primitive(TypeKind::Invariant)
                } else if forall && is_invariant_wr(&body) {
                    primitive(TypeKind::InvariantWeak)
                } else if forall && is_guard(&body) {
                    primitive(TypeKind::Guard)
                } else if is_constraint(&body) {
                    primitive(TypeKind::Constraint)
                } else {
                    self.handle_error(&body, ErrorImpl::Expected { what: "boolean" });
                    Type::unknown()
                };

                if body.changes_any_variable() {
                    self.handle_error(&body, ErrorImpl::MustBeSideEffectFree { subject: "expression" });
                }
                ty
            }

            ExprKind::Sum => {
                if let Some(bound) = left.symbol() {
                    self.check_type(&bound.get_type());
                }
                let body = right;
                let ty = if is_integral(&body) {
                    primitive(TypeKind::Int)
                } else if is_number(&body) {
                    primitive(TypeKind::Double)
                } else {
                    self.handle_error(&body, ErrorImpl::Expected { what: "number" });
                    Type::unknown()
                };

                if body.changes_any_variable() {
                    self.handle_error(&body, ErrorImpl::MustBeSideEffectFree { subject: "expression" });
                }
                ty
            }

            kind if Self::is_query_kind(kind) => match self.check_query_expression(expr, kind) {
                Some(ty) => ty,
                None => return false,
            },

            // Identifiers, constants, lists, record accesses, synchronisations
            // and dynamic quantifiers are typed when they are built.
            _ => return true,
        };

        if ty.is_unknown() {
            self.handle_error(expr, ErrorImpl::TypeError);
            false
        } else {
            expr.set_type(ty);
            true
        }
    }

    fn classify_conjunction(&self, left: &Expression, right: &Expression) -> Type {
        if is_integral(left) && is_integral(right) {
            primitive(TypeKind::Bool)
        } else if is_invariant(left) && is_invariant(right) {
            primitive(TypeKind::Invariant)
        } else if left.get_type().is_invariant_wr() && right.get_type().is_invariant_wr() {
            primitive(TypeKind::InvariantWeak)
        } else if is_guard(left) && is_guard(right) {
            primitive(TypeKind::Guard)
        } else if is_constraint(left) && is_constraint(right) {
            primitive(TypeKind::Constraint)
        } else if is_formula(left) && is_formula(right) {
            primitive(TypeKind::Formula)
        } else {
            Type::unknown()
        }
    }

    /// `None` when an argument was rejected; the error is already reported.
    fn check_math_function(&self, expr: &Expression, function: MathFunction) -> Option<Type> {
        use MathFunction::*;

        let require = |i: usize, accepted: fn(&Expression) -> bool, what: &'static str| {
            let arg = expr.get(i);
            if accepted(&arg) {
                Some(())
            } else {
                self.handle_error(&arg, ErrorImpl::Expected { what });
                None
            }
        };

        match function {
            Abs | Fpclassify => {
                require(0, is_integral, "integer")?;
                Some(primitive(TypeKind::Int))
            }
            Ilogb | Fint => {
                require(0, is_number, "number")?;
                Some(primitive(TypeKind::Int))
            }
            Isfinite | Isinf | Isnan | Isnormal | Signbit | Isunordered => {
                require(0, is_number, "number")?;
                Some(primitive(TypeKind::Bool))
            }
            Ldexp => {
                require(1, is_integral, "integer")?;
                require(0, is_number, "number")?;
                Some(primitive(TypeKind::Double))
            }
            _ => {
                if matches!(function, Fma | RandomTri) {
                    require(2, is_number, "number")?;
                }
                if matches!(
                    function,
                    Fma | RandomTri
                        | Fmod
                        | Fmax
                        | Fmin
                        | Fdim
                        | Pow
                        | Hypot
                        | Atan2
                        | Nextafter
                        | Copysign
                        | RandomArcsine
                        | RandomBeta
                        | RandomGamma
                        | RandomNormal
                        | RandomWeibull
                ) {
                    require(1, is_number, "number")?;
                }
                require(0, is_number, "number")?;
                Some(primitive(TypeKind::Double))
            }
        }
    }
}
