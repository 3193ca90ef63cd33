//! Compatibility relations between types and the lvalue predicates.

use crate::{
    ast::{
        expressions::{ExprKind, Expression},
        types::{Type, TypeKind},
    },
    errors::errors::ErrorImpl,
};

use super::type_checker::TypeChecker;

/// Urgent channels rank 0, non-urgent broadcast channels 1, anything else 2.
/// An argument must rank at least as high as the parameter it is bound to.
pub fn channel_capability(ty: &Type) -> u8 {
    if ty.is(TypeKind::Urgent) {
        0
    } else if ty.is(TypeKind::Broadcast) {
        1
    } else {
        2
    }
}

fn same_range(a: &Type, b: &Type) -> bool {
    match (a.get_range(), b.get_range()) {
        (Some((l1, u1)), Some((l2, u2))) => l1.equal(&l2) && u1.equal(&u2),
        (None, None) => true,
        _ => false,
    }
}

/// Name equivalence of scalar sets: both sides must reach the same
/// typedef names with identical bounds.
pub fn is_same_scalar_type(t1: &Type, t2: &Type) -> bool {
    let wrapper = |ty: &Type| {
        matches!(
            ty.kind(),
            Some(TypeKind::Ref | TypeKind::Constant | TypeKind::SystemMeta)
        )
    };

    if wrapper(t1) {
        return is_same_scalar_type(&t1.get(0), t2);
    }
    if wrapper(t2) {
        return is_same_scalar_type(t1, &t2.get(0));
    }
    match (t1.kind(), t2.kind()) {
        (Some(TypeKind::Label), Some(TypeKind::Label)) => {
            t1.get_label(0) == t2.get_label(0) && is_same_scalar_type(&t1.get(0), &t2.get(0))
        }
        (Some(TypeKind::Scalar), Some(TypeKind::Scalar)) => true,
        (Some(TypeKind::Range), Some(TypeKind::Range)) => {
            is_same_scalar_type(&t1.get(0), &t2.get(0)) && same_range(t1, t2)
        }
        _ => false,
    }
}

/// Values of assignable types can be stored: integers, booleans, doubles,
/// clocks, costs, scalars and arrays or records of those.
pub fn is_assignable(ty: &Type) -> bool {
    match ty.kind() {
        None => false,
        Some(
            TypeKind::Int
            | TypeKind::Bool
            | TypeKind::Double
            | TypeKind::Clock
            | TypeKind::Cost
            | TypeKind::Scalar,
        ) => true,
        Some(TypeKind::Array) => is_assignable(&ty.get(0)),
        Some(TypeKind::Record) => (0..ty.size()).all(|i| is_assignable(&ty.get(i))),
        Some(_) => ty.size() > 0 && is_assignable(&ty.get(0)),
    }
}

/// Structural equivalence ignoring const, meta and reference prefixes.
pub fn are_equivalent(a: &Type, b: &Type) -> bool {
    if a.is_integer() && b.is_integer() {
        !a.is(TypeKind::Range) || !b.is(TypeKind::Range) || same_range(a, b)
    } else if a.is_boolean() && b.is_boolean() {
        true
    } else if a.is_clock() && b.is_clock() {
        true
    } else if a.is_channel() && b.is_channel() {
        channel_capability(a) == channel_capability(b)
    } else if a.is_record() && b.is_record() {
        let size = a.get_record_size();
        size == b.get_record_size()
            && (0..size).all(|i| {
                a.get_record_label(i) == b.get_record_label(i)
                    && are_equivalent(&a.get_sub_at(i), &b.get_sub_at(i))
            })
    } else if a.is_array() && b.is_array() {
        let a_size = a.get_array_size();
        let b_size = b.get_array_size();
        if a_size.is_integer() && b_size.is_integer() {
            same_range(&a_size, &b_size) && are_equivalent(&a.get_sub(), &b.get_sub())
        } else if a_size.is_scalar() && b_size.is_scalar() {
            is_same_scalar_type(&a_size, &b_size) && are_equivalent(&a.get_sub(), &b.get_sub())
        } else {
            false
        }
    } else if a.is_scalar() && b.is_scalar() {
        is_same_scalar_type(a, b)
    } else {
        a.is_double() && b.is_double()
    }
}

/// Whether a value of type `rvalue` may be stored in an lvalue of type
/// `lvalue`. Integer ranges are not checked. With `init` set, the rules
/// for variable initialisers apply.
pub fn are_assignment_compatible(lvalue: &Type, rvalue: &Type, init: bool) -> bool {
    let numeric = if init {
        lvalue.is_clock() && rvalue.is_double()
    } else {
        (lvalue.is_clock() || lvalue.is_double())
            && (rvalue.is_integral() || rvalue.is_double() || rvalue.is_clock())
    };

    numeric || (lvalue.is_integral() && rvalue.is_integral()) || are_equivalent(lvalue, rvalue)
}

/// Whether two types can be compared with `==` and `!=`.
pub fn are_eq_compatible(t1: &Type, t2: &Type) -> bool {
    (t1.is_integral() && t2.is_integral())
        || (t1.is(TypeKind::ProcessVar) && t2.is(TypeKind::ProcessVar))
        || are_equivalent(t1, t2)
}

pub fn are_inline_if_compatible(t1: &Type, t2: &Type) -> bool {
    (t1.is_integral() && t2.is_integral()) || are_equivalent(t1, t2)
}

pub fn is_lvalue(expr: &Expression) -> bool {
    match expr.kind() {
        Some(ExprKind::Identifier | ExprKind::PreIncrement | ExprKind::PreDecrement) => true,
        Some(kind) if kind.is_assignment() => true,
        Some(ExprKind::Dot | ExprKind::Array) => is_lvalue(&expr.get(0)),
        Some(ExprKind::InlineIf) => {
            is_lvalue(&expr.get(1))
                && is_lvalue(&expr.get(2))
                && are_equivalent(&expr.get(1).get_type(), &expr.get(2).get_type())
        }
        Some(ExprKind::Comma) => is_lvalue(&expr.get(1)),
        _ => false,
    }
}

pub fn is_modifiable_lvalue(expr: &Expression) -> bool {
    match expr.kind() {
        Some(ExprKind::Identifier) => expr.get_type().is_non_constant(),
        // Process fields are only visible to side-effect free properties.
        Some(ExprKind::Dot) => {
            !expr.get(0).get_type().is_process() && is_modifiable_lvalue(&expr.get(0))
        }
        Some(ExprKind::Array) => is_modifiable_lvalue(&expr.get(0)),
        Some(ExprKind::PreIncrement | ExprKind::PreDecrement) => true,
        Some(kind) if kind.is_assignment() => true,
        Some(ExprKind::InlineIf) => {
            is_modifiable_lvalue(&expr.get(1))
                && is_modifiable_lvalue(&expr.get(2))
                && are_equivalent(&expr.get(1).get_type(), &expr.get(2).get_type())
        }
        Some(ExprKind::Comma) => is_modifiable_lvalue(&expr.get(1)),
        _ => false,
    }
}

/// Whether `arg` may be passed for a parameter of type `parameter`.
pub fn is_parameter_compatible(parameter: &Type, arg: &Expression) -> bool {
    let reference = parameter.is(TypeKind::Ref);
    let constant = parameter.is_constant();
    let lvalue = is_modifiable_lvalue(arg);
    let arg_type = arg.get_type();

    if reference && !constant && !lvalue {
        return false;
    }

    if parameter.is_channel() && arg_type.is_channel() {
        channel_capability(&arg_type) >= channel_capability(parameter)
    } else if reference && lvalue {
        are_equivalent(&arg_type, parameter)
    } else {
        are_assignment_compatible(parameter, &arg_type, false)
    }
}

impl TypeChecker<'_> {
    /// Like an lvalue, but every array index on the way must be computable
    /// at compile time, so the reference always denotes the same variable.
    pub fn is_unique_reference(&self, expr: &Expression) -> bool {
        match expr.kind() {
            Some(ExprKind::Identifier) => true,
            Some(ExprKind::Dot) => self.is_unique_reference(&expr.get(0)),
            Some(ExprKind::Array) => {
                self.is_unique_reference(&expr.get(0))
                    && self.is_compile_time_computable(&expr.get(1))
            }
            Some(ExprKind::PreIncrement | ExprKind::PreDecrement) => {
                self.is_unique_reference(&expr.get(0))
            }
            Some(kind) if kind.is_assignment() => self.is_unique_reference(&expr.get(0)),
            Some(ExprKind::Comma) => self.is_unique_reference(&expr.get(1)),
            _ => false,
        }
    }

    pub fn check_parameter_compatible(&self, parameter: &Type, arg: &Expression) -> bool {
        if is_parameter_compatible(parameter, arg) {
            true
        } else {
            self.handle_error(arg, ErrorImpl::IncompatibleArgument);
            false
        }
    }
}
