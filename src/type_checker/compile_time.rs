use crate::{
    ast::{
        expressions::Expression,
        symbols::{Symbol, SymbolSet},
        types::TypeKind,
    },
    system::system::{Instance, SystemVisitor},
};

use super::type_checker::TypeChecker;

/// Symbols whose value is known before the model runs: declared constants
/// and the constant, non-reference, non-double parameters of instances.
#[derive(Debug, Default)]
pub struct CompileTimeComputableValues {
    symbols: SymbolSet,
}

impl CompileTimeComputableValues {
    pub fn new() -> Self {
        CompileTimeComputableValues::default()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl SystemVisitor for CompileTimeComputableValues {
    fn visit_variable(&mut self, variable: &Symbol) {
        if variable.get_type().is_constant() {
            self.symbols.insert(variable.clone());
        }
    }

    fn visit_instance(&mut self, instance: &Instance) {
        for parameter in instance.parameters.iter() {
            let ty = parameter.get_type();
            if !ty.is(TypeKind::Ref) && ty.is_constant() && !ty.is_double() {
                self.symbols.insert(parameter.clone());
            }
        }
    }
}

impl TypeChecker<'_> {
    /// True when every symbol `expr` could read, through function calls
    /// included, is a function or has a value known at compile time.
    /// Random draws are never computable.
    pub fn is_compile_time_computable(&self, expr: &Expression) -> bool {
        if expr.has_random() {
            return false;
        }

        let mut reads = SymbolSet::new();
        expr.collect_possible_reads(&mut reads);
        reads
            .iter()
            .all(|symbol| symbol.get_type().is(TypeKind::Function) || self.compile_time.contains(symbol))
    }
}
