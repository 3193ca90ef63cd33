//! Statements of function bodies and the visitor protocol over them.
//!
//! Every compound statement owns its children, so a body is a plain tree
//! dropped together with the function it belongs to. Traversal goes through
//! `Stmt::accept`, which routes each variant to one `StmtVisitor` method.
//! The default methods descend into child statements, so a visitor only
//! overrides the variants it cares about.

use std::slice::Iter;

use super::{
    expressions::Expression,
    symbols::{Frame, Symbol, SymbolSet},
};

#[derive(Debug)]
pub struct ExpressionStmt {
    pub expression: Expression,
}

#[derive(Debug)]
pub struct AssertStmt {
    pub expression: Expression,
}

#[derive(Debug)]
pub struct ForStmt {
    pub init: Expression,
    pub cond: Expression,
    pub step: Expression,
    pub body: Box<Stmt>,
}

/// `for (i : T) body`, iterating over every value of the type of `symbol`.
#[derive(Debug)]
pub struct IterationStmt {
    pub symbol: Symbol,
    pub frame: Frame,
    pub body: Box<Stmt>,
}

#[derive(Debug)]
pub struct WhileStmt {
    pub cond: Expression,
    pub body: Box<Stmt>,
}

#[derive(Debug)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub cond: Expression,
}

/// A sequence of statements with the scope of its local declarations.
#[derive(Debug, Default)]
pub struct BlockStmt {
    pub frame: Frame,
    pub body: Vec<Stmt>,
}

impl BlockStmt {
    pub fn new(frame: Frame, body: Vec<Stmt>) -> Self {
        BlockStmt { frame, body }
    }

    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.body.push(stmt);
    }

    pub fn returns(&self) -> bool {
        self.body.last().is_some_and(Stmt::returns)
    }
}

#[derive(Debug)]
pub struct SwitchStmt {
    pub cond: Expression,
    pub block: BlockStmt,
}

#[derive(Debug)]
pub struct CaseStmt {
    pub cond: Expression,
    pub block: BlockStmt,
}

#[derive(Debug)]
pub struct DefaultStmt {
    pub block: BlockStmt,
}

#[derive(Debug)]
pub struct IfStmt {
    pub cond: Expression,
    pub true_case: Box<Stmt>,
    pub false_case: Option<Box<Stmt>>,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Expression,
}

#[derive(Debug)]
pub enum Stmt {
    Empty,
    Expression(ExpressionStmt),
    Assert(AssertStmt),
    For(ForStmt),
    Iteration(IterationStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    Block(BlockStmt),
    Switch(SwitchStmt),
    Case(CaseStmt),
    Default(DefaultStmt),
    If(IfStmt),
    Break,
    Continue,
    Return(ReturnStmt),
}

impl Stmt {
    pub fn expression(expression: Expression) -> Stmt {
        Stmt::Expression(ExpressionStmt { expression })
    }

    pub fn assert(expression: Expression) -> Stmt {
        Stmt::Assert(AssertStmt { expression })
    }

    pub fn for_loop(init: Expression, cond: Expression, step: Expression, body: Stmt) -> Stmt {
        Stmt::For(ForStmt {
            init,
            cond,
            step,
            body: Box::new(body),
        })
    }

    pub fn iteration(symbol: Symbol, frame: Frame, body: Stmt) -> Stmt {
        Stmt::Iteration(IterationStmt {
            symbol,
            frame,
            body: Box::new(body),
        })
    }

    pub fn while_loop(cond: Expression, body: Stmt) -> Stmt {
        Stmt::While(WhileStmt {
            cond,
            body: Box::new(body),
        })
    }

    pub fn do_while(body: Stmt, cond: Expression) -> Stmt {
        Stmt::DoWhile(DoWhileStmt {
            body: Box::new(body),
            cond,
        })
    }

    pub fn block(frame: Frame, body: Vec<Stmt>) -> Stmt {
        Stmt::Block(BlockStmt::new(frame, body))
    }

    pub fn if_else(cond: Expression, true_case: Stmt, false_case: Option<Stmt>) -> Stmt {
        Stmt::If(IfStmt {
            cond,
            true_case: Box::new(true_case),
            false_case: false_case.map(Box::new),
        })
    }

    pub fn ret(value: Expression) -> Stmt {
        Stmt::Return(ReturnStmt { value })
    }

    /// True when control can never fall off the end of the statement
    /// because every path through it returns.
    ///
    /// An `if` only returns when it has an else branch and both branches
    /// return; a lone `if` never does, even if its branch always returns.
    pub fn returns(&self) -> bool {
        match self {
            Stmt::DoWhile(stmt) => stmt.body.returns(),
            Stmt::Block(block) => block.returns(),
            Stmt::If(stmt) => {
                stmt.true_case.returns()
                    && stmt.false_case.as_ref().is_some_and(|s| s.returns())
            }
            Stmt::Return(_) => true,
            Stmt::Empty
            | Stmt::Expression(_)
            | Stmt::Assert(_)
            | Stmt::For(_)
            | Stmt::Iteration(_)
            | Stmt::While(_)
            | Stmt::Switch(_)
            | Stmt::Case(_)
            | Stmt::Default(_)
            | Stmt::Break
            | Stmt::Continue => false,
        }
    }

    pub fn accept<V: StmtVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Stmt::Empty => visitor.visit_empty_stmt(),
            Stmt::Expression(stmt) => visitor.visit_expression_stmt(stmt),
            Stmt::Assert(stmt) => visitor.visit_assert_stmt(stmt),
            Stmt::For(stmt) => visitor.visit_for_stmt(stmt),
            Stmt::Iteration(stmt) => visitor.visit_iteration_stmt(stmt),
            Stmt::While(stmt) => visitor.visit_while_stmt(stmt),
            Stmt::DoWhile(stmt) => visitor.visit_do_while_stmt(stmt),
            Stmt::Block(stmt) => visitor.visit_block_stmt(stmt),
            Stmt::Switch(stmt) => visitor.visit_switch_stmt(stmt),
            Stmt::Case(stmt) => visitor.visit_case_stmt(stmt),
            Stmt::Default(stmt) => visitor.visit_default_stmt(stmt),
            Stmt::If(stmt) => visitor.visit_if_stmt(stmt),
            Stmt::Break => visitor.visit_break_stmt(),
            Stmt::Continue => visitor.visit_continue_stmt(),
            Stmt::Return(stmt) => visitor.visit_return_stmt(stmt),
        }
    }
}

/// One method per statement variant. Leaves do nothing by default and
/// compound statements descend into their children in order.
pub trait StmtVisitor {
    fn visit_empty_stmt(&mut self) {}

    fn visit_expression_stmt(&mut self, _stmt: &ExpressionStmt) {}

    fn visit_assert_stmt(&mut self, _stmt: &AssertStmt) {}

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        stmt.body.accept(self);
    }

    fn visit_iteration_stmt(&mut self, stmt: &IterationStmt) {
        stmt.body.accept(self);
    }

    fn visit_while_stmt(&mut self, stmt: &WhileStmt) {
        stmt.body.accept(self);
    }

    fn visit_do_while_stmt(&mut self, stmt: &DoWhileStmt) {
        stmt.body.accept(self);
    }

    fn visit_block_stmt(&mut self, stmt: &BlockStmt) {
        for child in stmt.iter() {
            child.accept(self);
        }
    }

    fn visit_switch_stmt(&mut self, stmt: &SwitchStmt) {
        self.visit_block_stmt(&stmt.block);
    }

    fn visit_case_stmt(&mut self, stmt: &CaseStmt) {
        self.visit_block_stmt(&stmt.block);
    }

    fn visit_default_stmt(&mut self, stmt: &DefaultStmt) {
        self.visit_block_stmt(&stmt.block);
    }

    fn visit_if_stmt(&mut self, stmt: &IfStmt) {
        stmt.true_case.accept(self);
        if let Some(false_case) = &stmt.false_case {
            false_case.accept(self);
        }
    }

    fn visit_break_stmt(&mut self) {}

    fn visit_continue_stmt(&mut self) {}

    fn visit_return_stmt(&mut self, _stmt: &ReturnStmt) {}
}

/// Calls a closure on every expression reachable from a statement:
/// conditions, initialisers, steps, return values and, for blocks, the
/// initialisers of the block's own variables before its statements.
pub struct ExpressionWalker<F: FnMut(&Expression)> {
    callback: F,
}

impl<F: FnMut(&Expression)> ExpressionWalker<F> {
    pub fn new(callback: F) -> Self {
        ExpressionWalker { callback }
    }

    fn visit(&mut self, expr: &Expression) {
        (self.callback)(expr)
    }
}

impl<F: FnMut(&Expression)> StmtVisitor for ExpressionWalker<F> {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) {
        self.visit(&stmt.expression);
    }

    fn visit_assert_stmt(&mut self, stmt: &AssertStmt) {
        self.visit(&stmt.expression);
    }

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        self.visit(&stmt.init);
        self.visit(&stmt.cond);
        self.visit(&stmt.step);
        stmt.body.accept(self);
    }

    fn visit_while_stmt(&mut self, stmt: &WhileStmt) {
        self.visit(&stmt.cond);
        stmt.body.accept(self);
    }

    fn visit_do_while_stmt(&mut self, stmt: &DoWhileStmt) {
        self.visit(&stmt.cond);
        stmt.body.accept(self);
    }

    fn visit_block_stmt(&mut self, stmt: &BlockStmt) {
        for symbol in stmt.frame.iter() {
            if let Some(variable) = symbol.as_variable() {
                self.visit(&variable.initialiser());
            }
        }
        for child in stmt.iter() {
            child.accept(self);
        }
    }

    fn visit_switch_stmt(&mut self, stmt: &SwitchStmt) {
        self.visit(&stmt.cond);
        self.visit_block_stmt(&stmt.block);
    }

    fn visit_case_stmt(&mut self, stmt: &CaseStmt) {
        self.visit(&stmt.cond);
        self.visit_block_stmt(&stmt.block);
    }

    fn visit_if_stmt(&mut self, stmt: &IfStmt) {
        self.visit(&stmt.cond);
        stmt.true_case.accept(self);
        if let Some(false_case) = &stmt.false_case {
            false_case.accept(self);
        }
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) {
        self.visit(&stmt.value);
    }
}

/// Adds every symbol the statement might write to `changes`.
pub fn collect_possible_writes(stmt: &Stmt, changes: &mut SymbolSet) {
    stmt.accept(&mut ExpressionWalker::new(|e: &Expression| {
        e.collect_possible_writes(changes)
    }));
}

/// Adds every symbol the statement might read to `dependencies`.
pub fn collect_possible_reads(stmt: &Stmt, dependencies: &mut SymbolSet) {
    stmt.accept(&mut ExpressionWalker::new(|e: &Expression| {
        e.collect_possible_reads(dependencies)
    }));
}

/// Expressions that are, or contain, spawn, exit, numof or a quantifier
/// over dynamic processes.
pub fn collect_dynamic_expressions(stmt: &Stmt) -> Vec<Expression> {
    let mut found = vec![];
    stmt.accept(&mut ExpressionWalker::new(|e: &Expression| {
        if e.is_dynamic() || e.has_dynamic_sub() {
            found.push(e.clone());
        }
    }));
    found
}

#[derive(Default)]
struct LocalVariables {
    symbols: Vec<Symbol>,
}

impl StmtVisitor for LocalVariables {
    fn visit_iteration_stmt(&mut self, stmt: &IterationStmt) {
        self.symbols.extend(stmt.frame.iter().cloned());
        stmt.body.accept(self);
    }

    fn visit_block_stmt(&mut self, stmt: &BlockStmt) {
        self.symbols.extend(stmt.frame.iter().cloned());
        for child in stmt.iter() {
            child.accept(self);
        }
    }
}

/// Every symbol declared in a scope nested anywhere inside `stmt`.
pub fn collect_local_symbols(stmt: &Stmt) -> Vec<Symbol> {
    let mut locals = LocalVariables::default();
    stmt.accept(&mut locals);
    locals.symbols
}
