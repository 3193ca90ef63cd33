use tracing::{debug, warn};

use crate::{
    ast::{
        expressions::{ExprKind, Expression, SyncKind},
        statements::{collect_dynamic_expressions, collect_possible_reads, collect_possible_writes},
        symbols::{Symbol, SymbolSet},
        types::{Type, TypeKind},
    },
    errors::errors::{ErrorImpl, WarningImpl},
    system::system::{
        Condition, Edge, Function, Gantt, Instance, IoDecl, Message, Progress, State, SyncUse, System,
        SystemVisitor, Template, Update,
    },
};

use super::{
    compile_time::CompileTimeComputableValues,
    declarations::valid_return_type,
    expressions::{is_clock, is_constraint, is_double, is_integer, is_integral},
    rate_decomposer::RateDecomposer,
};

/// Optional advisories. Only the broadcast input warnings are on by default.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Warn when a broadcast input edge has no guard.
    pub deterministic_input_warnings: bool,
    /// Warn about location invariants with strict upper bounds.
    pub strict_invariant_warnings: bool,
    /// Warn about synchronisations that do not suit refinement checking.
    pub refinement_warnings: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            deterministic_input_warnings: true,
            strict_invariant_warnings: false,
            refinement_warnings: false,
        }
    }
}

impl CheckerConfig {
    pub fn with_deterministic_input_warnings(mut self, enabled: bool) -> Self {
        self.deterministic_input_warnings = enabled;
        self
    }

    pub fn with_strict_invariant_warnings(mut self, enabled: bool) -> Self {
        self.strict_invariant_warnings = enabled;
        self
    }

    pub fn with_refinement_warnings(mut self, enabled: bool) -> Self {
        self.refinement_warnings = enabled;
        self
    }
}

/// One type checking pass over one system. Types are written into the
/// expressions of the system and diagnostics into its error and warning
/// lists.
pub struct TypeChecker<'a> {
    pub(super) system: &'a System,
    pub(super) config: CheckerConfig,
    pub(super) compile_time: CompileTimeComputableValues,
    sync_used: SyncUse,
    sync_error: bool,
    /// Declared return type of the function being checked.
    pub(super) return_type: Option<Type>,
    /// Whether the template being checked is dynamic.
    pub(super) template_dynamic: Option<bool>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(system: &'a System) -> Self {
        TypeChecker::with_config(system, CheckerConfig::default())
    }

    /// Collects the compile-time computable symbols of `system` and checks
    /// its before and after update expressions.
    pub fn with_config(system: &'a System, config: CheckerConfig) -> Self {
        let mut compile_time = CompileTimeComputableValues::new();
        system.accept(&mut compile_time);
        debug!(symbols = compile_time.len(), "collected compile-time computable symbols");

        let checker = TypeChecker {
            system,
            config,
            compile_time,
            sync_used: SyncUse::Unused,
            sync_error: false,
            return_type: None,
            template_dynamic: None,
        };
        checker.check_expression(system.get_before_update());
        checker.check_expression(system.get_after_update());
        checker
    }

    /// Runs the checker over every entity of the system. Returns true when
    /// the system has no errors afterwards.
    #[tracing::instrument(skip_all)]
    pub fn check_system(&mut self) -> bool {
        let system = self.system;
        system.accept(self);
        debug!(
            errors = system.errors().len(),
            warnings = system.warnings().len(),
            "type checking finished"
        );
        !system.has_errors()
    }

    pub fn compile_time_values(&self) -> &CompileTimeComputableValues {
        &self.compile_time
    }

    pub fn sync_used(&self) -> SyncUse {
        self.sync_used
    }

    pub(super) fn handle_error(&self, expr: &Expression, error: ErrorImpl) {
        self.system.add_error(error, expr.position());
    }

    pub(super) fn handle_warning(&self, expr: &Expression, warning: WarningImpl) {
        self.system.add_warning(warning, expr.position());
    }

    /// Moves the synchronisation mode out of `Unused` on the first
    /// synchronisation. The first synchronisation of the other family is
    /// an error, reported once per pass.
    fn record_sync(&mut self, sync: &Expression) {
        let io = matches!(sync.sync_kind(), Some(SyncKind::Bang | SyncKind::Que));
        let csp = sync.sync_kind() == Some(SyncKind::Csp);

        match self.sync_used {
            SyncUse::Unused if io => self.sync_used = SyncUse::Io,
            SyncUse::Unused if csp => self.sync_used = SyncUse::Csp,
            SyncUse::Io if csp => self.report_sync_conflict(sync, ErrorImpl::AssumedIoFoundCsp),
            SyncUse::Csp if io => self.report_sync_conflict(sync, ErrorImpl::AssumedCspFoundIo),
            _ => {}
        }
    }

    fn report_sync_conflict(&mut self, at: &Expression, error: ErrorImpl) {
        if !self.sync_error {
            self.sync_error = true;
            self.handle_error(at, error);
        }
    }

    /// A channel, or an array of channels indexed by compile-time
    /// computable, side-effect free expressions.
    fn check_channel_reference(&self, channel: &Expression) {
        if !self.check_expression(channel) {
            return;
        }

        let mut ty = channel.get_type();
        while ty.is_array() {
            ty = ty.get_sub();
        }
        if !ty.is_channel() {
            self.handle_error(channel, ErrorImpl::Expected { what: "channel" });
            return;
        }

        let mut access = channel.clone();
        while access.is(ExprKind::Array) {
            let index = access.get(1);
            if !self.is_compile_time_computable(&index) {
                self.handle_error(&index, ErrorImpl::MustBeComputableAtCompileTime);
            } else if index.changes_any_variable() {
                self.handle_error(&index, ErrorImpl::MustBeSideEffectFree { subject: "index" });
            }
            access = access.get(0);
        }
    }

    fn check_dynamic_expressions(&self, function: &Function) {
        for expr in collect_dynamic_expressions(&function.body) {
            self.handle_error(&expr, ErrorImpl::DynamicOutsideEdge);
        }
    }
}

fn has_strict_lower_bound(guard: &Expression) -> bool {
    let Some(kind) = guard.kind() else {
        return false;
    };
    match kind {
        ExprKind::And | ExprKind::Or => guard.children().iter().any(has_strict_lower_bound),
        // c > n, n < c
        ExprKind::Gt => is_clock(&guard.get(0)) && !is_clock(&guard.get(1)),
        ExprKind::Lt => !is_clock(&guard.get(0)) && is_clock(&guard.get(1)),
        ExprKind::Forall | ExprKind::Exists => has_strict_lower_bound(&guard.get(1)),
        _ => false,
    }
}

fn has_strict_upper_bound(guard: &Expression) -> bool {
    let Some(kind) = guard.kind() else {
        return false;
    };
    match kind {
        ExprKind::And | ExprKind::Or => guard.children().iter().any(has_strict_upper_bound),
        // c < n, n > c
        ExprKind::Lt => is_clock(&guard.get(0)) && !is_clock(&guard.get(1)),
        ExprKind::Gt => !is_clock(&guard.get(0)) && is_clock(&guard.get(1)),
        ExprKind::Forall | ExprKind::Exists => has_strict_upper_bound(&guard.get(1)),
        _ => false,
    }
}

impl SystemVisitor for TypeChecker<'_> {
    fn visit_system_before(&mut self, system: &System) {
        debug!(
            templates = system.templates.len() + system.dynamic_templates.len(),
            queries = system.queries.len(),
            "checking system"
        );
    }

    fn visit_system_after(&mut self, system: &System) {
        for priority in system.get_chan_priorities() {
            if !priority.head.is_empty() {
                self.check_channel_reference(&priority.head);
            }
            for (_, channel) in &priority.tail {
                if !channel.is_empty() {
                    self.check_channel_reference(channel);
                }
            }
        }
        system.set_sync_used(self.sync_used);
    }

    fn visit_variable(&mut self, variable: &Symbol) {
        let ty = variable.get_type();
        self.check_type(&ty);

        let Some(data) = variable.as_variable() else {
            return;
        };
        let init = data.initialiser();
        if init.is_dynamic() || init.has_dynamic_sub() {
            self.handle_error(&init, ErrorImpl::DynamicInitialiser);
        } else if !init.is_empty() && self.check_expression(&init) {
            if !self.is_compile_time_computable(&init) {
                self.handle_error(&init, ErrorImpl::MustBeComputableAtCompileTime);
            } else if init.changes_any_variable() {
                self.handle_error(&init, ErrorImpl::MustBeSideEffectFree { subject: "initialiser" });
            } else {
                data.set_initialiser(self.check_initialiser(&ty, &init));
            }
        }
    }

    fn visit_function(&mut self, function: &Function) {
        debug!(function = function.uid.name(), "checking function");

        let return_type = function.uid.get_type().get(0);
        self.check_type(&return_type);
        if !return_type.is_void() && !valid_return_type(&return_type) {
            self.system.add_error(ErrorImpl::InvalidReturnType, return_type.position());
        }

        self.return_type = Some(return_type);
        function.body.accept(self);
        self.return_type = None;

        self.check_dynamic_expressions(function);

        let mut changes = SymbolSet::new();
        let mut depends = SymbolSet::new();
        collect_possible_writes(&function.body, &mut changes);
        collect_possible_reads(&function.body, &mut depends);

        // Locals and parameters are not visible to callers.
        let parameters = function
            .frame()
            .into_iter()
            .flat_map(|frame| frame.iter().take(function.parameter_count()));
        for local in function.variables.iter().chain(parameters) {
            changes.remove(local);
            depends.remove(local);
        }

        match function.uid.as_function() {
            Some(effects) => {
                effects.set_changes(changes);
                effects.set_depends(depends);
            }
            None => warn!(function = function.uid.name(), "function symbol cannot record its effects"),
        }
    }

    fn visit_template_before(&mut self, template: &Template) -> bool {
        debug!(template = template.name(), dynamic = template.dynamic, "checking template");
        self.template_dynamic = Some(template.dynamic);
        true
    }

    fn visit_template_after(&mut self, _template: &Template) {
        self.template_dynamic = None;
    }

    fn visit_state(&mut self, state: &State) {
        let invariant = state.invariant();
        if !invariant.is_empty() && self.check_expression(&invariant) {
            let ty = invariant.get_type();
            if !ty.is_invariant_wr() {
                self.handle_error(
                    &invariant,
                    ErrorImpl::CannotBeUsedAs {
                        type_: ty.to_string(),
                        role: "an invariant",
                    },
                );
            } else if invariant.changes_any_variable() {
                self.handle_error(&invariant, ErrorImpl::MustBeSideEffectFree { subject: "invariant" });
            } else {
                let mut decomposer = RateDecomposer::new();
                decomposer.decompose(&invariant);
                state.set_invariant(decomposer.invariant.clone());
                // A rechecked invariant has lost its rate; keep the one split off before.
                if !decomposer.cost_rate.is_empty() {
                    state.set_cost_rate(decomposer.cost_rate.clone());
                }

                if decomposer.count_cost_rates > 1 {
                    self.handle_error(&invariant, ErrorImpl::OnlyOneCostRateAllowed);
                }
                if decomposer.has_clock_rates {
                    self.system.record_stop_watch();
                }
                if decomposer.has_strict_invariant {
                    self.system.record_strict_invariant();
                    if self.config.strict_invariant_warnings {
                        self.handle_warning(&invariant, WarningImpl::StrictInvariant);
                    }
                }
            }
        }

        let rate = &state.exponential_rate;
        if !rate.is_empty() && self.check_expression(rate) {
            if !is_integral(rate) && !rate.is(ExprKind::Fraction) && !is_double(rate) {
                self.handle_error(rate, ErrorImpl::Expected { what: "number" });
            }
        }
    }

    fn visit_edge(&mut self, edge: &Edge, target: Option<&State>) {
        for symbol in edge.select.iter() {
            self.check_type(&symbol.get_type());
        }

        let mut strict_bound = false;
        if !edge.guard.is_empty() && self.check_expression(&edge.guard) {
            let ty = edge.guard.get_type();
            if !ty.is_guard() {
                self.handle_error(
                    &edge.guard,
                    ErrorImpl::CannotBeUsedAs {
                        type_: ty.to_string(),
                        role: "a guard",
                    },
                );
            } else if edge.guard.changes_any_variable() {
                self.handle_error(&edge.guard, ErrorImpl::MustBeSideEffectFree { subject: "guard" });
            }

            if has_strict_lower_bound(&edge.guard) {
                if edge.control {
                    self.system.record_strict_lower_bound_on_controllable_edges();
                }
                strict_bound = true;
            }
            if has_strict_upper_bound(&edge.guard) {
                strict_bound = true;
            }
        }

        if !edge.sync.is_empty() && self.check_expression(&edge.sync) {
            let channel = edge.sync.get(0);
            let channel_type = channel.get_type();
            if !channel_type.is_channel() {
                self.handle_error(&channel, ErrorImpl::Expected { what: "channel" });
            } else if edge.sync.changes_any_variable() {
                self.handle_error(&edge.sync, ErrorImpl::MustBeSideEffectFree { subject: "synchronisation" });
            } else {
                let clock_guard = !edge.guard.is_empty() && !is_integral(&edge.guard);
                let urgent = channel_type.is(TypeKind::Urgent);
                let receives_broadcast =
                    channel_type.is(TypeKind::Broadcast) && edge.sync.sync_kind() == Some(SyncKind::Que);

                if urgent && clock_guard {
                    self.system.set_urgent_transition();
                    self.handle_warning(&edge.sync, WarningImpl::ClockGuardOnUrgentEdge);
                } else if receives_broadcast && clock_guard {
                    self.system.clock_guard_recv_broadcast();
                }

                if self.config.deterministic_input_warnings && receives_broadcast && edge.guard.is_true() {
                    match target {
                        None => self.handle_warning(&edge.sync, WarningImpl::NondeterministicInput),
                        Some(state) if !state.invariant().is_true() => {
                            self.handle_warning(&edge.sync, WarningImpl::GuardOnTargetInvariant)
                        }
                        Some(_) => {}
                    }
                }

                if urgent && strict_bound {
                    self.handle_warning(&edge.guard, WarningImpl::StrictBoundOnUrgentEdge);
                }
            }

            self.record_sync(&edge.sync);

            if self.config.refinement_warnings {
                match edge.sync.sync_kind() {
                    Some(SyncKind::Bang) if edge.control => {
                        self.handle_warning(&edge.sync, WarningImpl::ControllableOutput)
                    }
                    Some(SyncKind::Que) if !edge.control => {
                        self.handle_warning(&edge.sync, WarningImpl::UncontrollableInput)
                    }
                    Some(SyncKind::Csp) => self.handle_warning(&edge.sync, WarningImpl::CspWithRefinement),
                    _ => {}
                }
            }
        }

        self.check_assignment_expression(&edge.assign);
    }

    fn visit_message(&mut self, message: &Message) {
        let label = &message.label;
        if label.is_empty() || !self.check_expression(label) {
            return;
        }
        let channel = label.get(0);
        if !channel.get_type().is_channel() {
            self.handle_error(&channel, ErrorImpl::Expected { what: "channel" });
        } else if label.changes_any_variable() {
            self.handle_error(label, ErrorImpl::MustBeSideEffectFree { subject: "message" });
        }
    }

    fn visit_update(&mut self, update: &Update) {
        self.check_assignment_expression(&update.label);
    }

    fn visit_condition(&mut self, condition: &Condition) {
        let label = &condition.label;
        if label.is_empty() || !self.check_expression(label) {
            return;
        }
        let ty = label.get_type();
        if !ty.is_guard() {
            self.handle_error(
                label,
                ErrorImpl::CannotBeUsedAs {
                    type_: ty.to_string(),
                    role: "a condition",
                },
            );
        } else if label.changes_any_variable() {
            self.handle_error(label, ErrorImpl::MustBeSideEffectFree { subject: "condition" });
        }
    }

    /// Free parameters of a process are enumerated by the model checker,
    /// so they must range over a bounded set.
    fn visit_process(&mut self, process: &Instance) {
        for parameter in process.parameters.iter().take(process.unbound) {
            let ty = parameter.get_type();
            if !(ty.is_scalar() || ty.is(TypeKind::Range)) || ty.is(TypeKind::Ref) {
                self.system.add_error(ErrorImpl::UnboundedFreeParameter, ty.position());
            } else if process.restricted.contains(parameter) {
                self.system.add_error(ErrorImpl::RestrictedFreeParameter, ty.position());
            }
        }
    }

    fn visit_instance(&mut self, instance: &Instance) {
        let ty = instance.uid.get_type();
        for i in 0..ty.size() {
            self.check_type(&ty.get(i));
        }

        // Parameters after the free ones are bound by the instantiation.
        let bound = instance.parameters.iter().skip(ty.size()).take(instance.arguments);
        for parameter in bound {
            let argument = instance.mapping.get(parameter).cloned().unwrap_or_default();
            if !self.check_expression(&argument) {
                continue;
            }
            if argument.changes_any_variable() {
                self.handle_error(&argument, ErrorImpl::MustBeSideEffectFree { subject: "argument" });
                continue;
            }

            let parameter_type = parameter.get_type();
            let reference = parameter_type.is(TypeKind::Ref);
            let constant = parameter_type.is_constant();
            let computable = self.is_compile_time_computable(&argument);
            if (!reference && !computable)
                || (reference && !constant && !self.is_unique_reference(&argument))
                || (reference && constant && !computable)
            {
                self.handle_error(&argument, ErrorImpl::IncompatibleArgument);
                continue;
            }
            self.check_parameter_compatible(&parameter_type, &argument);
        }
    }

    fn visit_io_decl(&mut self, io_decl: &IoDecl) {
        for param in &io_decl.params {
            if !self.check_expression(param) {
                continue;
            }
            if !is_integer(param) {
                self.handle_error(param, ErrorImpl::Expected { what: "integer" });
            } else if !self.is_compile_time_computable(param) {
                self.handle_error(param, ErrorImpl::MustBeComputableAtCompileTime);
            } else if param.changes_any_variable() {
                self.handle_error(param, ErrorImpl::MustBeSideEffectFree { subject: "index" });
            }
        }

        let io = !io_decl.inputs.is_empty() || !io_decl.outputs.is_empty();
        let csp = !io_decl.csp.is_empty();
        if self.sync_used == SyncUse::Unused {
            if io {
                self.sync_used = SyncUse::Io;
            } else if csp {
                self.sync_used = SyncUse::Csp;
            }
        }
        let culprit = match self.sync_used {
            SyncUse::Io if csp => io_decl.csp.first(),
            SyncUse::Csp if io => io_decl.inputs.first().or(io_decl.outputs.first()),
            _ => None,
        };
        if let Some(culprit) = culprit {
            if !self.sync_error {
                self.sync_error = true;
                self.handle_error(culprit, ErrorImpl::CspAndIoMixed);
            }
        }
        self.system.set_sync_used(self.sync_used);

        for channel in io_decl.inputs.iter().chain(&io_decl.outputs).chain(&io_decl.csp) {
            self.check_channel_reference(channel);
        }
    }

    fn visit_progress_measure(&mut self, progress: &Progress) {
        self.check_expression(&progress.guard);
        self.check_expression(&progress.measure);

        if !progress.guard.is_empty() && !is_integral(&progress.guard) {
            self.handle_error(&progress.guard, ErrorImpl::ProgressGuardNotBoolean);
        }
        if !is_integral(&progress.measure) {
            self.handle_error(&progress.measure, ErrorImpl::ProgressMeasureNotValue);
        }
    }

    fn visit_gantt_chart(&mut self, gantt: &Gantt) {
        for parameter in gantt.parameters.iter() {
            self.check_type(&parameter.get_type());
        }

        for map in &gantt.mapping {
            for parameter in map.parameters.iter() {
                self.check_type(&parameter.get_type());
            }

            if self.check_expression(&map.predicate)
                && !is_integral(&map.predicate)
                && !is_constraint(&map.predicate)
            {
                self.handle_error(&map.predicate, ErrorImpl::Expected { what: "boolean" });
            }
            if self.check_expression(&map.mapping) && !is_integral(&map.mapping) {
                self.handle_error(&map.mapping, ErrorImpl::Expected { what: "integer" });
            }
        }
    }

    fn visit_hybrid_clock(&mut self, clock: &Expression) {
        if !self.check_expression(clock) {
            return;
        }
        if !is_clock(clock) {
            self.handle_error(clock, ErrorImpl::Expected { what: "clock" });
        } else if clock.changes_any_variable() {
            self.handle_error(clock, ErrorImpl::MustBeSideEffectFree { subject: "index" });
        }
    }

    fn visit_property(&mut self, property: &Expression) {
        self.check_property(property);
    }
}
