use crate::{
    ast::{
        expressions::Expression,
        statements::{
            AssertStmt, BlockStmt, DoWhileStmt, ExpressionStmt, ForStmt, IfStmt, IterationStmt, ReturnStmt,
            StmtVisitor, WhileStmt,
        },
        types::TypeKind,
    },
    errors::errors::ErrorImpl,
};

use super::{expressions::is_integral, type_checker::TypeChecker};

impl TypeChecker<'_> {
    /// Loop and branch conditions must be boolean valued.
    fn check_condition(&self, cond: &Expression) {
        if !cond.is_empty() && self.check_expression(cond) && !is_integral(cond) {
            self.handle_error(cond, ErrorImpl::Expected { what: "boolean" });
        }
    }
}

impl StmtVisitor for TypeChecker<'_> {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) {
        self.check_assignment_expression(&stmt.expression);
    }

    fn visit_assert_stmt(&mut self, stmt: &AssertStmt) {
        if self.check_expression(&stmt.expression) && stmt.expression.changes_any_variable() {
            self.handle_error(&stmt.expression, ErrorImpl::MustBeSideEffectFree { subject: "assertion" });
        }
    }

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        self.check_assignment_expression(&stmt.init);
        self.check_condition(&stmt.cond);
        self.check_assignment_expression(&stmt.step);
        stmt.body.accept(self);
    }

    fn visit_iteration_stmt(&mut self, stmt: &IterationStmt) {
        let ty = stmt.symbol.get_type();
        self.check_type(&ty);

        if !ty.is_scalar() && !ty.is_integer() {
            self.system.add_error(ErrorImpl::Expected { what: "scalar set or integer" }, ty.position());
        } else if !ty.is(TypeKind::Range) {
            self.system.add_error(ErrorImpl::Expected { what: "range" }, ty.position());
        }
        stmt.body.accept(self);
    }

    fn visit_while_stmt(&mut self, stmt: &WhileStmt) {
        self.check_condition(&stmt.cond);
        stmt.body.accept(self);
    }

    fn visit_do_while_stmt(&mut self, stmt: &DoWhileStmt) {
        stmt.body.accept(self);
        self.check_condition(&stmt.cond);
    }

    /// Local declarations first, then the statements in order.
    fn visit_block_stmt(&mut self, stmt: &BlockStmt) {
        for symbol in stmt.frame.iter() {
            let ty = symbol.get_type();
            self.check_type(&ty);

            let Some(data) = symbol.as_variable() else {
                continue;
            };
            let init = data.initialiser();
            if init.is_empty() || !self.check_expression(&init) {
                continue;
            }
            if init.changes_any_variable() {
                self.handle_error(&init, ErrorImpl::MustBeSideEffectFree { subject: "initialiser" });
            } else {
                data.set_initialiser(self.check_initialiser(&ty, &init));
            }
        }

        for child in stmt.iter() {
            child.accept(self);
        }
    }

    fn visit_if_stmt(&mut self, stmt: &IfStmt) {
        self.check_condition(&stmt.cond);
        stmt.true_case.accept(self);
        if let Some(false_case) = &stmt.false_case {
            false_case.accept(self);
        }
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) {
        if stmt.value.is_empty() || !self.check_expression(&stmt.value) {
            return;
        }
        match self.return_type.clone() {
            Some(return_type) => {
                self.check_parameter_compatible(&return_type, &stmt.value);
            }
            None => self.handle_error(
                &stmt.value,
                ErrorImpl::Internal {
                    message: "return outside of a function".to_string(),
                },
            ),
        }
    }
}
