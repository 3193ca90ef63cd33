use std::{
    cell::{Cell, Ref, RefCell},
    collections::HashMap,
};

use tracing::trace;

use crate::{
    ast::{
        expressions::Expression,
        statements::{collect_local_symbols, BlockStmt, Stmt},
        symbols::{Frame, Symbol, SymbolSet},
    },
    errors::errors::{Error, ErrorImpl, Warning, WarningImpl},
    Position,
};

/// Which synchronisation family the model uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncUse {
    #[default]
    Unused,
    /// `c!` / `c?`
    Io,
    Csp,
}

#[derive(Debug)]
pub struct State {
    pub uid: Symbol,
    invariant: RefCell<Expression>,
    cost_rate: RefCell<Expression>,
    pub exponential_rate: Expression,
}

impl State {
    pub fn new(uid: Symbol, invariant: Expression) -> Self {
        State {
            uid,
            invariant: RefCell::new(invariant),
            cost_rate: RefCell::new(Expression::empty()),
            exponential_rate: Expression::empty(),
        }
    }

    pub fn with_exponential_rate(mut self, rate: Expression) -> Self {
        self.exponential_rate = rate;
        self
    }

    pub fn invariant(&self) -> Expression {
        self.invariant.borrow().clone()
    }

    pub fn set_invariant(&self, invariant: Expression) {
        *self.invariant.borrow_mut() = invariant;
    }

    pub fn cost_rate(&self) -> Expression {
        self.cost_rate.borrow().clone()
    }

    pub fn set_cost_rate(&self, rate: Expression) {
        *self.cost_rate.borrow_mut() = rate;
    }
}

#[derive(Debug, Default)]
pub struct Edge {
    pub src: usize,
    /// Target location, absent for edges into branch points.
    pub dst: Option<usize>,
    pub control: bool,
    pub select: Frame,
    pub guard: Expression,
    pub sync: Expression,
    pub assign: Expression,
}

#[derive(Debug)]
pub struct Function {
    pub uid: Symbol,
    pub body: Stmt,
    /// Every symbol declared inside the body, parameters included.
    pub variables: Vec<Symbol>,
}

impl Function {
    /// `body`'s frame starts with one symbol per parameter of `uid`'s type.
    pub fn new(uid: Symbol, body: BlockStmt) -> Self {
        let body = Stmt::Block(body);
        let variables = collect_local_symbols(&body);
        Function {
            uid,
            body,
            variables,
        }
    }

    pub fn frame(&self) -> Option<&Frame> {
        match &self.body {
            Stmt::Block(block) => Some(&block.frame),
            _ => None,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.uid.get_type().size().saturating_sub(1)
    }
}

#[derive(Debug)]
pub enum Declaration {
    Variable(Symbol),
    Function(Function),
}

/// LSC message, `label` is a synchronisation on a channel.
#[derive(Debug, Default)]
pub struct Message {
    pub label: Expression,
}

/// LSC condition.
#[derive(Debug, Default)]
pub struct Condition {
    pub label: Expression,
}

/// LSC update.
#[derive(Debug, Default)]
pub struct Update {
    pub label: Expression,
}

#[derive(Debug, Default)]
pub struct Template {
    pub uid: Option<Symbol>,
    pub parameters: Frame,
    pub declarations: Vec<Declaration>,
    pub states: Vec<State>,
    pub edges: Vec<Edge>,
    pub messages: Vec<Message>,
    pub updates: Vec<Update>,
    pub conditions: Vec<Condition>,
    pub dynamic: bool,
    pub is_defined: bool,
}

impl Template {
    pub fn new(uid: Symbol, parameters: Frame) -> Self {
        Template {
            uid: Some(uid),
            parameters,
            is_defined: true,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        self.uid.as_ref().map(Symbol::name).unwrap_or("")
    }
}

/// A process or partial instantiation of a template.
///
/// `parameters` lists the free parameters of the instance first, followed
/// by the template parameters; `mapping` binds template parameters to
/// argument expressions.
#[derive(Debug)]
pub struct Instance {
    pub uid: Symbol,
    pub parameters: Frame,
    pub mapping: HashMap<Symbol, Expression>,
    /// Number of template parameters bound by this instantiation.
    pub arguments: usize,
    /// Number of leading parameters left free.
    pub unbound: usize,
    /// Free parameters used in array sizes or select bounds.
    pub restricted: SymbolSet,
}

impl Instance {
    pub fn new(uid: Symbol, parameters: Frame) -> Self {
        Instance {
            uid,
            parameters,
            mapping: HashMap::new(),
            arguments: 0,
            unbound: 0,
            restricted: SymbolSet::new(),
        }
    }
}

/// Interface declaration of a component, used by refinement checking.
#[derive(Debug, Default)]
pub struct IoDecl {
    pub name: String,
    pub position: Position,
    pub params: Vec<Expression>,
    pub inputs: Vec<Expression>,
    pub outputs: Vec<Expression>,
    pub csp: Vec<Expression>,
}

#[derive(Debug, Default)]
pub struct Progress {
    pub guard: Expression,
    pub measure: Expression,
}

#[derive(Debug, Default)]
pub struct GanttMap {
    pub parameters: Frame,
    pub predicate: Expression,
    pub mapping: Expression,
}

#[derive(Debug, Default)]
pub struct Gantt {
    pub name: String,
    pub parameters: Frame,
    pub mapping: Vec<GanttMap>,
}

/// `chan priority head < a, b < default`. Empty expressions stand for
/// `default`.
#[derive(Debug, Default)]
pub struct ChanPriority {
    pub head: Expression,
    pub tail: Vec<(char, Expression)>,
}

#[derive(Debug, Default)]
struct Features {
    stop_watch: Cell<bool>,
    strict_invariants: Cell<bool>,
    strict_lower_bound_on_controllable_edges: Cell<bool>,
    urgent_transition: Cell<bool>,
    clock_guard_recv_broadcast: Cell<bool>,
    sync_used: Cell<SyncUse>,
}

#[derive(Debug, Default)]
pub struct System {
    pub globals: Vec<Declaration>,
    pub templates: Vec<Template>,
    pub dynamic_templates: Vec<Template>,
    pub processes: Vec<Instance>,
    pub instances: Vec<Instance>,
    pub io_decls: Vec<IoDecl>,
    pub progress: Vec<Progress>,
    pub gantt_charts: Vec<Gantt>,
    pub hybrid_clocks: Vec<Expression>,
    pub chan_priorities: Vec<ChanPriority>,
    pub queries: Vec<Expression>,
    pub before_update: Expression,
    pub after_update: Expression,
    errors: RefCell<Vec<Error>>,
    warnings: RefCell<Vec<Warning>>,
    features: Features,
}

impl System {
    pub fn new() -> Self {
        System::default()
    }

    pub fn get_dynamic_template(&self, name: &str) -> Option<&Template> {
        self.dynamic_templates.iter().find(|t| t.name() == name)
    }

    pub fn get_before_update(&self) -> &Expression {
        &self.before_update
    }

    pub fn get_after_update(&self) -> &Expression {
        &self.after_update
    }

    pub fn get_chan_priorities(&self) -> &[ChanPriority] {
        &self.chan_priorities
    }

    pub fn add_error(&self, error: ErrorImpl, position: Position) {
        trace!(%position, %error, "error");
        self.errors.borrow_mut().push(Error::new(error, position));
    }

    pub fn add_warning(&self, warning: WarningImpl, position: Position) {
        trace!(%position, %warning, "warning");
        self.warnings.borrow_mut().push(Warning::new(warning, position));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.borrow().is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.borrow().is_empty()
    }

    pub fn errors(&self) -> Ref<'_, Vec<Error>> {
        self.errors.borrow()
    }

    pub fn warnings(&self) -> Ref<'_, Vec<Warning>> {
        self.warnings.borrow()
    }

    pub fn clear_diagnostics(&self) {
        self.errors.borrow_mut().clear();
        self.warnings.borrow_mut().clear();
    }

    pub fn record_stop_watch(&self) {
        trace!("stop watch recorded");
        self.features.stop_watch.set(true);
    }

    pub fn has_stop_watch(&self) -> bool {
        self.features.stop_watch.get()
    }

    pub fn record_strict_invariant(&self) {
        trace!("strict invariant recorded");
        self.features.strict_invariants.set(true);
    }

    pub fn has_strict_invariants(&self) -> bool {
        self.features.strict_invariants.get()
    }

    pub fn record_strict_lower_bound_on_controllable_edges(&self) {
        trace!("strict lower bound on controllable edge recorded");
        self.features.strict_lower_bound_on_controllable_edges.set(true);
    }

    pub fn has_strict_lower_bound_on_controllable_edges(&self) -> bool {
        self.features.strict_lower_bound_on_controllable_edges.get()
    }

    pub fn set_urgent_transition(&self) {
        trace!("urgent transition recorded");
        self.features.urgent_transition.set(true);
    }

    pub fn has_urgent_transition(&self) -> bool {
        self.features.urgent_transition.get()
    }

    pub fn clock_guard_recv_broadcast(&self) {
        trace!("clock guard on broadcast receiver recorded");
        self.features.clock_guard_recv_broadcast.set(true);
    }

    pub fn has_clock_guard_recv_broadcast(&self) -> bool {
        self.features.clock_guard_recv_broadcast.get()
    }

    pub fn set_sync_used(&self, sync: SyncUse) {
        trace!(?sync, "sync use recorded");
        self.features.sync_used.set(sync);
    }

    pub fn get_sync_used(&self) -> SyncUse {
        self.features.sync_used.get()
    }

    /// Drives `visitor` over every entity of the model.
    pub fn accept<V: SystemVisitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_system_before(self);

        visit_declarations(visitor, &self.globals);

        for template in self.templates.iter().chain(&self.dynamic_templates) {
            visit_template(visitor, template);
        }

        for process in &self.processes {
            visitor.visit_process(process);
        }
        for instance in &self.instances {
            visitor.visit_instance(instance);
        }
        for io_decl in &self.io_decls {
            visitor.visit_io_decl(io_decl);
        }
        for progress in &self.progress {
            visitor.visit_progress_measure(progress);
        }
        for gantt in &self.gantt_charts {
            visitor.visit_gantt_chart(gantt);
        }
        for clock in &self.hybrid_clocks {
            visitor.visit_hybrid_clock(clock);
        }
        for query in &self.queries {
            visitor.visit_property(query);
        }

        visitor.visit_system_after(self);
    }
}

fn visit_declarations<V: SystemVisitor + ?Sized>(visitor: &mut V, declarations: &[Declaration]) {
    for declaration in declarations {
        match declaration {
            Declaration::Variable(symbol) => visitor.visit_variable(symbol),
            Declaration::Function(function) => visitor.visit_function(function),
        }
    }
}

fn visit_template<V: SystemVisitor + ?Sized>(visitor: &mut V, template: &Template) {
    if !visitor.visit_template_before(template) {
        return;
    }

    visit_declarations(visitor, &template.declarations);
    for state in &template.states {
        visitor.visit_state(state);
    }
    for edge in &template.edges {
        let target = edge.dst.and_then(|dst| template.states.get(dst));
        visitor.visit_edge(edge, target);
    }
    for message in &template.messages {
        visitor.visit_message(message);
    }
    for update in &template.updates {
        visitor.visit_update(update);
    }
    for condition in &template.conditions {
        visitor.visit_condition(condition);
    }

    visitor.visit_template_after(template);
}

/// Callbacks for each kind of model entity, in the order `System::accept`
/// visits them. Every method defaults to doing nothing.
pub trait SystemVisitor {
    fn visit_system_before(&mut self, _system: &System) {}

    fn visit_system_after(&mut self, _system: &System) {}

    fn visit_variable(&mut self, _variable: &Symbol) {}

    fn visit_function(&mut self, _function: &Function) {}

    /// Returning false skips the contents of the template.
    fn visit_template_before(&mut self, _template: &Template) -> bool {
        true
    }

    fn visit_template_after(&mut self, _template: &Template) {}

    fn visit_state(&mut self, _state: &State) {}

    fn visit_edge(&mut self, _edge: &Edge, _target: Option<&State>) {}

    fn visit_message(&mut self, _message: &Message) {}

    fn visit_update(&mut self, _update: &Update) {}

    fn visit_condition(&mut self, _condition: &Condition) {}

    fn visit_process(&mut self, _process: &Instance) {}

    fn visit_instance(&mut self, _instance: &Instance) {}

    fn visit_io_decl(&mut self, _io_decl: &IoDecl) {}

    fn visit_progress_measure(&mut self, _progress: &Progress) {}

    fn visit_gantt_chart(&mut self, _gantt: &Gantt) {}

    fn visit_hybrid_clock(&mut self, _clock: &Expression) {}

    fn visit_property(&mut self, _property: &Expression) {}
}
