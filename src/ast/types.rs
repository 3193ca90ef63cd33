//! The type lattice of the modeling language.
//!
//! A type is a tree. Its root kind is either:
//!
//! - a base kind (integers, clocks, channels, ...)
//! - a structural wrapper around child types (ranges, arrays, records, labels, references)
//! - a prefix qualifying its single child (urgent, broadcast, committed, hybrid, const, meta)
//! - a marker kind the type checker assigns to expressions it has classified
//!   (invariants, guards, constraints, formulas, ...)
//!
//! Most queries look through prefixes, ranges, references and labels, so
//! `const int[0,5]` is an integer and a constant at the same time.

use std::{fmt::Display, rc::Rc};

use crate::Position;

use super::expressions::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Int,
    Bool,
    Double,
    Clock,
    Cost,
    Scalar,
    Channel,
    Location,
    Process,
    Instance,
    Function,
    Array,
    Record,
    Range,
    Ref,
    Label,

    Urgent,
    Committed,
    Broadcast,
    Hybrid,
    Constant,
    SystemMeta,

    Invariant,
    InvariantWeak,
    Guard,
    Diff,
    Constraint,
    Formula,
    Rate,
    Fraction,
    TioGraph,
    ProcessVar,
    DoubleInvGuard,
}

impl TypeKind {
    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            TypeKind::Urgent
                | TypeKind::Committed
                | TypeKind::Broadcast
                | TypeKind::Hybrid
                | TypeKind::Constant
                | TypeKind::SystemMeta
        )
    }

    /// Wrappers that queries look through to reach the underlying type.
    fn is_transparent(self) -> bool {
        self.is_prefix() || matches!(self, TypeKind::Range | TypeKind::Ref | TypeKind::Label)
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Void => "void",
            TypeKind::Int => "int",
            TypeKind::Bool => "bool",
            TypeKind::Double => "double",
            TypeKind::Clock => "clock",
            TypeKind::Cost => "cost",
            TypeKind::Scalar => "scalar",
            TypeKind::Channel => "chan",
            TypeKind::Location => "location",
            TypeKind::Process => "process",
            TypeKind::Instance => "instance",
            TypeKind::Function => "function",
            TypeKind::Array => "array",
            TypeKind::Record => "struct",
            TypeKind::Range => "range",
            TypeKind::Ref => "ref",
            TypeKind::Label => "label",
            TypeKind::Urgent => "urgent",
            TypeKind::Committed => "committed",
            TypeKind::Broadcast => "broadcast",
            TypeKind::Hybrid => "hybrid",
            TypeKind::Constant => "const",
            TypeKind::SystemMeta => "meta",
            TypeKind::Invariant => "invariant",
            TypeKind::InvariantWeak => "invariant with rates",
            TypeKind::Guard => "guard",
            TypeKind::Diff => "clock difference",
            TypeKind::Constraint => "constraint",
            TypeKind::Formula => "formula",
            TypeKind::Rate => "rate",
            TypeKind::Fraction => "fraction",
            TypeKind::TioGraph => "TIO graph",
            TypeKind::ProcessVar => "process variable",
            TypeKind::DoubleInvGuard => "double invariant or guard",
        }
    }
}

#[derive(Debug)]
struct TypeChild {
    label: String,
    child: Type,
}

#[derive(Debug)]
struct TypeData {
    kind: TypeKind,
    position: Position,
    children: Vec<TypeChild>,
    expr: Expression,
}

/// Shared handle to an immutable type tree. The empty handle is the
/// "unknown" type that unchecked expressions carry.
#[derive(Debug, Clone, Default)]
pub struct Type(Option<Rc<TypeData>>);

impl Type {
    fn node(kind: TypeKind, children: Vec<TypeChild>, expr: Expression) -> Self {
        Type(Some(Rc::new(TypeData {
            kind,
            position: Position::null(),
            children,
            expr,
        })))
    }

    pub fn unknown() -> Self {
        Type(None)
    }

    pub fn primitive(kind: TypeKind) -> Self {
        Type::node(kind, vec![], Expression::empty())
    }

    /// Wraps `self` in a prefix, reference or label-less wrapper of `kind`.
    pub fn prefix(&self, kind: TypeKind) -> Self {
        Type::node(
            kind,
            vec![TypeChild {
                label: String::new(),
                child: self.clone(),
            }],
            Expression::empty(),
        )
    }

    pub fn reference(&self) -> Self {
        self.prefix(TypeKind::Ref)
    }

    pub fn constant(&self) -> Self {
        self.prefix(TypeKind::Constant)
    }

    pub fn label(&self, name: &str) -> Self {
        Type::node(
            TypeKind::Label,
            vec![TypeChild {
                label: String::from(name),
                child: self.clone(),
            }],
            Expression::empty(),
        )
    }

    pub fn range(base: Type, lower: Expression, upper: Expression) -> Self {
        Type::node(
            TypeKind::Range,
            vec![
                TypeChild {
                    label: String::new(),
                    child: base,
                },
                TypeChild {
                    label: String::new(),
                    child: Type::node(TypeKind::Void, vec![], lower),
                },
                TypeChild {
                    label: String::new(),
                    child: Type::node(TypeKind::Void, vec![], upper),
                },
            ],
            Expression::empty(),
        )
    }

    /// `element[size]`, where `size` is normally a range type.
    pub fn array(element: Type, size: Type) -> Self {
        Type::node(
            TypeKind::Array,
            vec![
                TypeChild {
                    label: String::new(),
                    child: element,
                },
                TypeChild {
                    label: String::new(),
                    child: size,
                },
            ],
            Expression::empty(),
        )
    }

    pub fn record(fields: Vec<(&str, Type)>) -> Self {
        Type::labelled(TypeKind::Record, fields)
    }

    pub fn process(parameters: Vec<(&str, Type)>) -> Self {
        Type::labelled(TypeKind::Process, parameters)
    }

    pub fn instance(parameters: Vec<(&str, Type)>) -> Self {
        Type::labelled(TypeKind::Instance, parameters)
    }

    fn labelled(kind: TypeKind, fields: Vec<(&str, Type)>) -> Self {
        let children = fields
            .into_iter()
            .map(|(label, child)| TypeChild {
                label: String::from(label),
                child,
            })
            .collect();
        Type::node(kind, children, Expression::empty())
    }

    /// The first child is the return type, the rest are parameter types.
    pub fn function(result: Type, parameters: Vec<Type>) -> Self {
        let children = std::iter::once(result)
            .chain(parameters)
            .map(|child| TypeChild {
                label: String::new(),
                child,
            })
            .collect();
        Type::node(TypeKind::Function, children, Expression::empty())
    }

    pub fn with_position(&self, position: Position) -> Self {
        match &self.0 {
            None => Type(None),
            Some(data) => Type(Some(Rc::new(TypeData {
                kind: data.kind,
                position,
                children: data
                    .children
                    .iter()
                    .map(|c| TypeChild {
                        label: c.label.clone(),
                        child: c.child.clone(),
                    })
                    .collect(),
                expr: data.expr.clone(),
            }))),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_none()
    }

    pub fn kind(&self) -> Option<TypeKind> {
        self.0.as_ref().map(|data| data.kind)
    }

    pub fn position(&self) -> Position {
        self.0
            .as_ref()
            .map(|data| data.position.clone())
            .unwrap_or_default()
    }

    pub fn size(&self) -> usize {
        self.0.as_ref().map(|data| data.children.len()).unwrap_or(0)
    }

    /// Direct child `i`, or the unknown type when absent.
    pub fn get(&self, i: usize) -> Type {
        self.0
            .as_ref()
            .and_then(|data| data.children.get(i))
            .map(|c| c.child.clone())
            .unwrap_or_default()
    }

    pub fn get_label(&self, i: usize) -> &str {
        self.0
            .as_ref()
            .and_then(|data| data.children.get(i))
            .map(|c| c.label.as_str())
            .unwrap_or("")
    }

    pub fn expression(&self) -> Expression {
        self.0
            .as_ref()
            .map(|data| data.expr.clone())
            .unwrap_or_default()
    }

    fn transparent(&self) -> bool {
        self.kind().is_some_and(TypeKind::is_transparent)
    }

    pub fn is_prefix(&self) -> bool {
        self.kind().is_some_and(TypeKind::is_prefix)
    }

    /// True when `kind` is the root kind or is reachable through
    /// transparent wrappers. Process variables and double invariant/guard
    /// markers only ever match themselves.
    pub fn is(&self, kind: TypeKind) -> bool {
        match self.kind() {
            None => false,
            Some(TypeKind::ProcessVar) => kind == TypeKind::ProcessVar,
            Some(TypeKind::DoubleInvGuard) => kind == TypeKind::DoubleInvGuard,
            Some(own) => own == kind || (own.is_transparent() && self.get(0).is(kind)),
        }
    }

    pub fn is_integer(&self) -> bool {
        self.is(TypeKind::Int)
    }

    pub fn is_boolean(&self) -> bool {
        self.is(TypeKind::Bool)
    }

    pub fn is_integral(&self) -> bool {
        self.is_integer() || self.is_boolean() || self.is(TypeKind::ProcessVar)
    }

    pub fn is_double(&self) -> bool {
        self.is(TypeKind::Double)
    }

    pub fn is_clock(&self) -> bool {
        self.is(TypeKind::Clock)
    }

    pub fn is_cost(&self) -> bool {
        self.is(TypeKind::Cost)
    }

    pub fn is_diff(&self) -> bool {
        self.is(TypeKind::Diff)
    }

    pub fn is_scalar(&self) -> bool {
        self.is(TypeKind::Scalar)
    }

    pub fn is_channel(&self) -> bool {
        self.is(TypeKind::Channel)
    }

    pub fn is_location(&self) -> bool {
        self.is(TypeKind::Location)
    }

    pub fn is_process(&self) -> bool {
        self.is(TypeKind::Process)
    }

    pub fn is_array(&self) -> bool {
        self.is(TypeKind::Array)
    }

    pub fn is_record(&self) -> bool {
        self.is(TypeKind::Record)
    }

    pub fn is_void(&self) -> bool {
        self.is(TypeKind::Void)
    }

    pub fn is_invariant(&self) -> bool {
        self.is(TypeKind::Invariant) || self.is_integral()
    }

    /// Invariant, possibly with rate equations mixed in.
    pub fn is_invariant_wr(&self) -> bool {
        self.is_invariant() || self.is(TypeKind::InvariantWeak)
    }

    pub fn is_guard(&self) -> bool {
        self.is(TypeKind::Guard) || self.is_invariant()
    }

    pub fn is_constraint(&self) -> bool {
        self.is(TypeKind::Constraint) || self.is_guard()
    }

    pub fn is_formula(&self) -> bool {
        self.is(TypeKind::Formula) || self.is_constraint()
    }

    pub fn is_constant(&self) -> bool {
        match self.kind() {
            None => false,
            Some(TypeKind::Function | TypeKind::Process | TypeKind::Instance) => false,
            Some(TypeKind::Constant) => true,
            Some(TypeKind::Record) => (0..self.size()).all(|i| self.get(i).is_constant()),
            Some(_) => self.size() > 0 && self.get(0).is_constant(),
        }
    }

    pub fn is_non_constant(&self) -> bool {
        match self.kind() {
            None => true,
            Some(TypeKind::Function | TypeKind::Process | TypeKind::Instance) => false,
            Some(TypeKind::Constant) => false,
            Some(TypeKind::Record) => (0..self.size()).all(|i| self.get(i).is_non_constant()),
            Some(_) => self.size() == 0 || self.get(0).is_non_constant(),
        }
    }

    /// Element type of an array, keeping any prefix of the array itself.
    pub fn get_sub(&self) -> Type {
        match self.kind() {
            Some(TypeKind::Ref | TypeKind::Label) => self.get(0).get_sub(),
            Some(kind) if kind.is_prefix() => self.get(0).get_sub().prefix(kind),
            _ => self.get(0),
        }
    }

    /// Field `i` of a record (or parameter `i` of a process), keeping prefixes.
    pub fn get_sub_at(&self, i: usize) -> Type {
        match self.kind() {
            Some(TypeKind::Ref | TypeKind::Label) => self.get(0).get_sub_at(i),
            Some(kind) if kind.is_prefix() => self.get(0).get_sub_at(i).prefix(kind),
            _ => self.get(i),
        }
    }

    pub fn get_array_size(&self) -> Type {
        if self.is_prefix() || matches!(self.kind(), Some(TypeKind::Ref | TypeKind::Label)) {
            self.get(0).get_array_size()
        } else {
            self.get(1)
        }
    }

    pub fn get_record_size(&self) -> usize {
        if self.is_prefix() || matches!(self.kind(), Some(TypeKind::Ref | TypeKind::Label)) {
            self.get(0).get_record_size()
        } else {
            self.size()
        }
    }

    pub fn get_record_label(&self, i: usize) -> String {
        if self.is_prefix() || matches!(self.kind(), Some(TypeKind::Ref | TypeKind::Label)) {
            self.get(0).get_record_label(i)
        } else {
            String::from(self.get_label(i))
        }
    }

    /// Index of the record field named `label`.
    pub fn find_index_of(&self, label: &str) -> Option<usize> {
        (0..self.get_record_size()).find(|&i| self.get_record_label(i) == label)
    }

    /// Lower and upper bound of the nearest range wrapper.
    pub fn get_range(&self) -> Option<(Expression, Expression)> {
        match self.kind() {
            Some(TypeKind::Range) => Some((self.get(1).expression(), self.get(2).expression())),
            Some(kind) if kind.is_transparent() => self.get(0).get_range(),
            _ => None,
        }
    }

    /// The underlying type without prefixes, ranges, references or labels.
    pub fn strip(&self) -> Type {
        if self.transparent() {
            self.get(0).strip()
        } else {
            self.clone()
        }
    }

    pub fn strip_array(&self) -> Type {
        let mut ty = self.strip();
        while ty.kind() == Some(TypeKind::Array) {
            ty = ty.get(0).strip();
        }
        ty
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(kind) = self.kind() else {
            return write!(f, "unknown");
        };
        match kind {
            kind if kind.is_prefix() => write!(f, "{} {}", kind.name(), self.get(0)),
            TypeKind::Ref => write!(f, "{}&", self.get(0)),
            TypeKind::Label => write!(f, "{}", self.get_label(0)),
            TypeKind::Range => write!(
                f,
                "{}[{},{}]",
                self.get(0),
                self.get(1).expression(),
                self.get(2).expression()
            ),
            TypeKind::Array => write!(f, "{}[{}]", self.get(0), self.get(1)),
            TypeKind::Record => {
                write!(f, "struct {{ ")?;
                for i in 0..self.size() {
                    write!(f, "{} {}; ", self.get(i), self.get_label(i))?;
                }
                write!(f, "}}")
            }
            _ => write!(f, "{}", kind.name()),
        }
    }
}
