//! Symbols and the scopes (frames) they are declared in.

use std::{
    cell::{Ref, RefCell},
    collections::HashSet,
    fmt::Debug,
    hash::{Hash, Hasher},
    rc::Rc,
    slice::Iter,
};

use super::{expressions::Expression, types::Type};

pub type SymbolSet = HashSet<Symbol>;

/// Storage of a declared variable. The initialiser is replaced in place
/// once it has been checked and reordered.
#[derive(Debug, Default)]
pub struct Variable {
    init: RefCell<Expression>,
}

impl Variable {
    pub fn initialiser(&self) -> Expression {
        self.init.borrow().clone()
    }

    pub fn set_initialiser(&self, init: Expression) {
        *self.init.borrow_mut() = init;
    }
}

/// Symbols outside a function body that the function may write or read.
#[derive(Debug, Default)]
pub struct FunctionEffects {
    changes: RefCell<SymbolSet>,
    depends: RefCell<SymbolSet>,
}

impl FunctionEffects {
    pub fn changes(&self) -> Ref<'_, SymbolSet> {
        self.changes.borrow()
    }

    pub fn depends(&self) -> Ref<'_, SymbolSet> {
        self.depends.borrow()
    }

    pub fn set_changes(&self, changes: SymbolSet) {
        *self.changes.borrow_mut() = changes;
    }

    pub fn set_depends(&self, depends: SymbolSet) {
        *self.depends.borrow_mut() = depends;
    }
}

enum SymbolPayload {
    None,
    Variable(Variable),
    Function(FunctionEffects),
}

struct SymbolData {
    name: String,
    ty: Type,
    payload: SymbolPayload,
}

/// Shared handle to a declared name. Two symbols are equal only when they
/// are the same declaration.
#[derive(Clone)]
pub struct Symbol(Rc<SymbolData>);

impl Symbol {
    fn with_payload(name: &str, ty: Type, payload: SymbolPayload) -> Self {
        Symbol(Rc::new(SymbolData {
            name: String::from(name),
            ty,
            payload,
        }))
    }

    /// A symbol without storage, such as a location, template or parameter.
    pub fn new(name: &str, ty: Type) -> Self {
        Symbol::with_payload(name, ty, SymbolPayload::None)
    }

    pub fn variable(name: &str, ty: Type, init: Expression) -> Self {
        Symbol::with_payload(
            name,
            ty,
            SymbolPayload::Variable(Variable {
                init: RefCell::new(init),
            }),
        )
    }

    pub fn function(name: &str, ty: Type) -> Self {
        Symbol::with_payload(name, ty, SymbolPayload::Function(FunctionEffects::default()))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn get_type(&self) -> Type {
        self.0.ty.clone()
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.0.payload {
            SymbolPayload::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionEffects> {
        match &self.0.payload {
            SymbolPayload::Function(effects) => Some(effects),
            _ => None,
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state)
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.0.name)
    }
}

/// An ordered scope of declarations.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    symbols: Vec<Symbol>,
}

impl Frame {
    pub fn new() -> Self {
        Frame { symbols: vec![] }
    }

    pub fn add(&mut self, symbol: Symbol) -> Symbol {
        self.symbols.push(symbol.clone());
        symbol
    }

    pub fn get(&self, i: usize) -> Option<&Symbol> {
        self.symbols.get(i)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.name() == name)
    }
}

impl From<Vec<Symbol>> for Frame {
    fn from(symbols: Vec<Symbol>) -> Self {
        Frame { symbols }
    }
}
