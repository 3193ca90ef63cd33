use crate::{
    ast::{
        expressions::{ExprKind, Expression},
        types::{Type, TypeKind},
    },
    errors::errors::{ErrorImpl, WarningImpl},
};

use super::{
    compatibility::{are_assignment_compatible, is_assignable},
    type_checker::TypeChecker,
};

/// Functions may return integers, booleans, scalars, doubles and records
/// of those.
pub fn valid_return_type(ty: &Type) -> bool {
    match ty.kind() {
        Some(TypeKind::Record) => (0..ty.size()).all(|i| valid_return_type(&ty.get(i))),
        Some(TypeKind::Range | TypeKind::Label) => valid_return_type(&ty.get(0)),
        Some(TypeKind::Int | TypeKind::Bool | TypeKind::Scalar | TypeKind::Double) => true,
        _ => false,
    }
}

impl TypeChecker<'_> {
    /// Checks that every prefix in `ty` is applied to a type that can
    /// carry it, that ranges and array sizes are well formed, and that
    /// record fields are legal.
    pub fn check_type(&self, ty: &Type) {
        self.check_type_in(ty, false, false);
    }

    fn check_type_in(&self, ty: &Type, initialisable: bool, in_struct: bool) {
        let Some(kind) = ty.kind() else {
            return;
        };

        match kind {
            TypeKind::Label => self.check_type_in(&ty.get(0), initialisable, in_struct),

            TypeKind::Urgent => {
                if !ty.is_location() && !ty.is_channel() {
                    self.type_error(
                        ty,
                        ErrorImpl::PrefixOnlyAllowedFor {
                            prefix: "urgent",
                            carriers: "locations and channels",
                        },
                    );
                }
                self.check_type_in(&ty.get(0), initialisable, in_struct);
            }

            TypeKind::Broadcast => {
                if !ty.is_channel() {
                    self.type_error(
                        ty,
                        ErrorImpl::PrefixOnlyAllowedFor {
                            prefix: "broadcast",
                            carriers: "channels",
                        },
                    );
                }
                self.check_type_in(&ty.get(0), initialisable, in_struct);
            }

            TypeKind::Committed => {
                if !ty.is_location() {
                    self.type_error(
                        ty,
                        ErrorImpl::PrefixOnlyAllowedFor {
                            prefix: "committed",
                            carriers: "locations",
                        },
                    );
                }
                self.check_type_in(&ty.get(0), initialisable, in_struct);
            }

            TypeKind::Hybrid => {
                if !ty.is_clock() && !(ty.is_array() && ty.strip_array().is_clock()) {
                    self.type_error(
                        ty,
                        ErrorImpl::PrefixOnlyAllowedFor {
                            prefix: "hybrid",
                            carriers: "clocks",
                        },
                    );
                }
                self.check_type_in(&ty.get(0), initialisable, in_struct);
            }

            TypeKind::Constant | TypeKind::SystemMeta => {
                if ty.is_clock() {
                    let prefix = if kind == TypeKind::Constant { "const" } else { "meta" };
                    self.type_error(ty, ErrorImpl::PrefixNotAllowedForClocks { prefix });
                }
                self.check_type_in(&ty.get(0), true, in_struct);
            }

            TypeKind::Ref => {
                let referable = ty.is_integral()
                    || ty.is_array()
                    || ty.is_record()
                    || ty.is_channel()
                    || ty.is_clock()
                    || ty.is_scalar()
                    || ty.is_double();
                if !referable {
                    self.type_error(ty, ErrorImpl::ReferenceNotAllowed);
                }
                self.check_type_in(&ty.get(0), initialisable, in_struct);
            }

            TypeKind::Range => {
                let base = ty.get(0);
                if !base.is_integer() && !base.is_scalar() {
                    self.type_error(ty, ErrorImpl::RangeNotAllowed);
                }
                if let Some((lower, upper)) = ty.get_range() {
                    for bound in [lower, upper] {
                        if !self.check_expression(&bound) {
                            continue;
                        }
                        if !bound.get_type().is_integer() {
                            self.handle_error(&bound, ErrorImpl::Expected { what: "integer" });
                        }
                        if !self.is_compile_time_computable(&bound) {
                            self.handle_error(&bound, ErrorImpl::MustBeComputableAtCompileTime);
                        }
                    }
                }
            }

            TypeKind::Array => {
                let size = ty.get_array_size();
                if !size.is(TypeKind::Range) {
                    self.type_error(ty, ErrorImpl::InvalidArraySize);
                } else {
                    self.check_type_in(&size, false, false);
                }
                self.check_type_in(&ty.get(0), initialisable, in_struct);
            }

            TypeKind::Record => {
                for i in 0..ty.size() {
                    self.check_type_in(&ty.get(i), true, true);
                }
            }

            TypeKind::Double => {
                if in_struct {
                    self.type_error(ty, ErrorImpl::NotAllowedInsideStruct);
                }
            }

            TypeKind::Int | TypeKind::Bool => {}

            _ => {
                if initialisable {
                    self.type_error(ty, ErrorImpl::CannotBeConstOrMeta);
                }
            }
        }
    }

    fn type_error(&self, ty: &Type, error: ErrorImpl) {
        self.system.add_error(error, ty.position());
    }

    /// Brings `init` into the shape of `ty`: array literals are checked
    /// element by element and record literals are reordered into field
    /// order. The returned expression replaces the original initialiser.
    pub fn check_initialiser(&self, ty: &Type, init: &Expression) -> Expression {
        if are_assignment_compatible(ty, &init.get_type(), true) {
            return init.clone();
        }

        let entries = init.get_type();
        if ty.is_array() && init.is(ExprKind::List) {
            let element = ty.get_sub();
            let mut result = Vec::with_capacity(entries.size());
            for i in 0..entries.size() {
                if !entries.get_label(i).is_empty() {
                    self.handle_error(&init.get(i), ErrorImpl::FieldNameInArrayInitialiser);
                }
                result.push(self.check_initialiser(&element, &init.get(i)));
            }
            return Expression::typed(ExprKind::List, result, ty.clone()).at(init.position());
        }

        if ty.is_record() && init.is(ExprKind::List) {
            let fields = ty.get_record_size();
            let mut result = vec![Expression::empty(); fields];
            let mut current = 0;
            for i in 0..entries.size() {
                let label = entries.get_label(i);
                if !label.is_empty() {
                    match ty.find_index_of(label) {
                        Some(index) => current = index,
                        None => {
                            self.handle_error(&init.get(i), ErrorImpl::UnknownField);
                            break;
                        }
                    }
                }

                let slot = current;
                current += 1;
                if slot >= fields {
                    self.handle_error(&init.get(i), ErrorImpl::TooManyElementsInInitialiser);
                    break;
                }
                if !result[slot].is_empty() {
                    self.handle_error(&init.get(i), ErrorImpl::MultipleInitialisersForField);
                    continue;
                }
                result[slot] = self.check_initialiser(&ty.get_sub_at(slot), &init.get(i));
            }

            if result.iter().any(Expression::is_empty) {
                self.handle_error(init, ErrorImpl::IncompleteInitialiser);
            }
            return Expression::typed(ExprKind::List, result, ty.clone()).at(init.position());
        }

        self.handle_error(init, ErrorImpl::InvalidInitialiser);
        init.clone()
    }

    /// Updates, for-loop steps and expression statements. The value must
    /// be storable or void, and discarding it should not be pointless.
    pub fn check_assignment_expression(&self, expr: &Expression) -> bool {
        if expr.is_empty() {
            return true;
        }
        if !self.check_expression(expr) {
            return false;
        }

        let ty = expr.get_type();
        if !is_assignable(&ty) && !ty.is_void() {
            self.handle_error(expr, ErrorImpl::InvalidAssignmentExpression);
            return false;
        }

        // `1` is what an empty update parses to.
        if !(expr.is(ExprKind::Constant) && expr.value() == 1) {
            self.check_ignored_value(expr);
        }
        true
    }

    pub(super) fn check_ignored_value(&self, expr: &Expression) {
        if !expr.is(ExprKind::Exit) && !expr.changes_any_variable() {
            self.handle_warning(expr, WarningImpl::ExpressionHasNoEffect);
        } else if expr.is(ExprKind::Comma) {
            self.check_ignored_value(&expr.get(1));
        }
    }
}
