//! Expressions of the modeling language.
//!
//! An `Expression` is a shared, cheaply cloned handle to an immutable node
//! with one mutable slot: the type inferred by the checker. Leaves built
//! from declarations (identifiers, constants, lists, record accesses,
//! calls) are typed at construction; operators start out unknown and are
//! typed by `TypeChecker::check_expression`.
//!
//! This module also carries the structural analyses the checker relies on:
//!
//! - possible writes and possible reads, including through function calls
//! - detection of dynamic process constructs and random draws
//! - structural equality and the "trivially true" test

use std::{cell::RefCell, collections::HashMap, fmt::Display, rc::Rc};

use lazy_static::lazy_static;

use crate::Position;

use super::{
    symbols::{Symbol, SymbolSet},
    types::{Type, TypeKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncKind {
    /// `c!`
    Bang,
    /// `c?`
    Que,
    /// `c`, CSP style
    Csp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathFunction {
    Abs,
    Fabs,
    Fmod,
    Fma,
    Fmax,
    Fmin,
    Fdim,
    Exp,
    Exp2,
    Expm1,
    Ln,
    Log,
    Log10,
    Log2,
    Log1p,
    Pow,
    Sqrt,
    Cbrt,
    Hypot,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Erf,
    Erfc,
    Tgamma,
    Lgamma,
    Ceil,
    Floor,
    Trunc,
    Round,
    Fint,
    Ldexp,
    Ilogb,
    Logb,
    Nextafter,
    Copysign,
    Fpclassify,
    Isfinite,
    Isinf,
    Isnan,
    Isnormal,
    Signbit,
    Isunordered,
    Random,
    RandomArcsine,
    RandomBeta,
    RandomGamma,
    RandomNormal,
    RandomPoisson,
    RandomWeibull,
    RandomTri,
}

lazy_static! {
    pub static ref MATH_LOOKUP: HashMap<&'static str, MathFunction> = {
        let mut map = HashMap::new();
        map.insert("abs", MathFunction::Abs);
        map.insert("fabs", MathFunction::Fabs);
        map.insert("fmod", MathFunction::Fmod);
        map.insert("fma", MathFunction::Fma);
        map.insert("fmax", MathFunction::Fmax);
        map.insert("fmin", MathFunction::Fmin);
        map.insert("fdim", MathFunction::Fdim);
        map.insert("exp", MathFunction::Exp);
        map.insert("exp2", MathFunction::Exp2);
        map.insert("expm1", MathFunction::Expm1);
        map.insert("ln", MathFunction::Ln);
        map.insert("log", MathFunction::Log);
        map.insert("log10", MathFunction::Log10);
        map.insert("log2", MathFunction::Log2);
        map.insert("log1p", MathFunction::Log1p);
        map.insert("pow", MathFunction::Pow);
        map.insert("sqrt", MathFunction::Sqrt);
        map.insert("cbrt", MathFunction::Cbrt);
        map.insert("hypot", MathFunction::Hypot);
        map.insert("sin", MathFunction::Sin);
        map.insert("cos", MathFunction::Cos);
        map.insert("tan", MathFunction::Tan);
        map.insert("asin", MathFunction::Asin);
        map.insert("acos", MathFunction::Acos);
        map.insert("atan", MathFunction::Atan);
        map.insert("atan2", MathFunction::Atan2);
        map.insert("sinh", MathFunction::Sinh);
        map.insert("cosh", MathFunction::Cosh);
        map.insert("tanh", MathFunction::Tanh);
        map.insert("asinh", MathFunction::Asinh);
        map.insert("acosh", MathFunction::Acosh);
        map.insert("atanh", MathFunction::Atanh);
        map.insert("erf", MathFunction::Erf);
        map.insert("erfc", MathFunction::Erfc);
        map.insert("tgamma", MathFunction::Tgamma);
        map.insert("lgamma", MathFunction::Lgamma);
        map.insert("ceil", MathFunction::Ceil);
        map.insert("floor", MathFunction::Floor);
        map.insert("trunc", MathFunction::Trunc);
        map.insert("round", MathFunction::Round);
        map.insert("fint", MathFunction::Fint);
        map.insert("ldexp", MathFunction::Ldexp);
        map.insert("ilogb", MathFunction::Ilogb);
        map.insert("logb", MathFunction::Logb);
        map.insert("nextafter", MathFunction::Nextafter);
        map.insert("copysign", MathFunction::Copysign);
        map.insert("fpclassify", MathFunction::Fpclassify);
        map.insert("isfinite", MathFunction::Isfinite);
        map.insert("isinf", MathFunction::Isinf);
        map.insert("isnan", MathFunction::Isnan);
        map.insert("isnormal", MathFunction::Isnormal);
        map.insert("signbit", MathFunction::Signbit);
        map.insert("isunordered", MathFunction::Isunordered);
        map.insert("random", MathFunction::Random);
        map.insert("random_arcsine", MathFunction::RandomArcsine);
        map.insert("random_beta", MathFunction::RandomBeta);
        map.insert("random_gamma", MathFunction::RandomGamma);
        map.insert("random_normal", MathFunction::RandomNormal);
        map.insert("random_poisson", MathFunction::RandomPoisson);
        map.insert("random_weibull", MathFunction::RandomWeibull);
        map.insert("random_tri", MathFunction::RandomTri);
        map
    };
}

impl MathFunction {
    pub fn from_name(name: &str) -> Option<MathFunction> {
        MATH_LOOKUP.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        MATH_LOOKUP
            .iter()
            .find(|(_, f)| **f == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    /// Functions drawing from a random distribution.
    pub fn is_random(self) -> bool {
        matches!(
            self,
            MathFunction::Random
                | MathFunction::RandomArcsine
                | MathFunction::RandomBeta
                | MathFunction::RandomGamma
                | MathFunction::RandomNormal
                | MathFunction::RandomPoisson
                | MathFunction::RandomWeibull
                | MathFunction::RandomTri
        )
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Constant,
    Identifier,
    Deadlock,
    List,
    Dot,
    Array,
    FunCall,
    Sync,

    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    BitLShift,
    BitRShift,
    Min,
    Max,
    Fraction,
    UnaryMinus,
    Rate,

    And,
    Or,
    Xor,
    Not,

    Lt,
    Le,
    Eq,
    Neq,
    Ge,
    Gt,

    Assign,
    AssPlus,
    AssMinus,
    AssMult,
    AssDiv,
    AssMod,
    AssAnd,
    AssOr,
    AssXor,
    AssLShift,
    AssRShift,
    PreIncrement,
    PostIncrement,
    PreDecrement,
    PostDecrement,

    InlineIf,
    Comma,

    Forall,
    Exists,
    Sum,
    ForallDynamic,
    ExistsDynamic,
    SumDynamic,
    Spawn,
    NumOf,
    Exit,

    Math(MathFunction),

    EF,
    EG,
    AF,
    AG,
    EFReach,
    AGReach,
    Leadsto,
    AUntil,
    AWeakUntil,
    ABuchi,
    Control,
    EFControl,
    ControlTopt,
    ControlToptDef1,
    ControlToptDef2,
    PoControl,
    SmcControl,
    PMax,
    Restrict,
    SimulationLe,
    SimulationGe,
    RefinementLe,
    RefinementGe,
    TioComposition,
    TioConjunction,
    TioQuotient,
    SyntaxComposition,
    Consistency,
    Specification,
    Implementation,
    Scenario,
    Scenario2,
    Simulate,
    SimulateReach,
    SupVar,
    InfVar,
    ProbaMinBox,
    ProbaMinDiamond,
    ProbaBox,
    ProbaDiamond,
    ProbaCmp,
    ProbaExp,
    MitlFormula,
    MitlUntil,
    MitlRelease,
    MitlDisj,
    MitlConj,
    MitlNext,
    MitlAtom,
    MitlExists,
    MitlForall,
}

impl ExprKind {
    /// `=` and the compound assignment operators.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            ExprKind::Assign
                | ExprKind::AssPlus
                | ExprKind::AssMinus
                | ExprKind::AssMult
                | ExprKind::AssDiv
                | ExprKind::AssMod
                | ExprKind::AssAnd
                | ExprKind::AssOr
                | ExprKind::AssXor
                | ExprKind::AssLShift
                | ExprKind::AssRShift
        )
    }

    pub fn is_increment(self) -> bool {
        matches!(
            self,
            ExprKind::PreIncrement
                | ExprKind::PostIncrement
                | ExprKind::PreDecrement
                | ExprKind::PostDecrement
        )
    }

    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            ExprKind::Spawn
                | ExprKind::NumOf
                | ExprKind::Exit
                | ExprKind::SumDynamic
                | ExprKind::ExistsDynamic
                | ExprKind::ForallDynamic
        )
    }

    fn symbol(self) -> &'static str {
        match self {
            ExprKind::Plus => "+",
            ExprKind::Minus | ExprKind::UnaryMinus => "-",
            ExprKind::Mult => "*",
            ExprKind::Div => "/",
            ExprKind::Mod => "%",
            ExprKind::BitAnd => "&",
            ExprKind::BitOr => "|",
            ExprKind::BitXor => "^",
            ExprKind::BitLShift => "<<",
            ExprKind::BitRShift => ">>",
            ExprKind::Min => "<?",
            ExprKind::Max => ">?",
            ExprKind::And => "&&",
            ExprKind::Or => "||",
            ExprKind::Xor => "xor",
            ExprKind::Not => "!",
            ExprKind::Lt => "<",
            ExprKind::Le => "<=",
            ExprKind::Eq => "==",
            ExprKind::Neq => "!=",
            ExprKind::Ge => ">=",
            ExprKind::Gt => ">",
            ExprKind::Assign => "=",
            ExprKind::AssPlus => "+=",
            ExprKind::AssMinus => "-=",
            ExprKind::AssMult => "*=",
            ExprKind::AssDiv => "/=",
            ExprKind::AssMod => "%=",
            ExprKind::AssAnd => "&=",
            ExprKind::AssOr => "|=",
            ExprKind::AssXor => "^=",
            ExprKind::AssLShift => "<<=",
            ExprKind::AssRShift => ">>=",
            ExprKind::Comma => ",",
            _ => "",
        }
    }
}

#[derive(Debug, Clone)]
struct ExprData {
    kind: ExprKind,
    position: Position,
    value: i32,
    double_value: f64,
    index: usize,
    sync: Option<SyncKind>,
    symbol: Option<Symbol>,
    children: Vec<Expression>,
    ty: RefCell<Type>,
}

impl ExprData {
    fn new(kind: ExprKind, children: Vec<Expression>, ty: Type) -> Self {
        ExprData {
            kind,
            position: Position::null(),
            value: 0,
            double_value: 0.0,
            index: 0,
            sync: None,
            symbol: None,
            children,
            ty: RefCell::new(ty),
        }
    }
}

/// Shared handle to an expression node. The empty handle stands for an
/// absent guard, invariant, update and so on.
#[derive(Debug, Clone, Default)]
pub struct Expression(Option<Rc<ExprData>>);

impl Expression {
    fn from_data(data: ExprData) -> Self {
        Expression(Some(Rc::new(data)))
    }

    pub fn empty() -> Self {
        Expression(None)
    }

    pub fn constant(value: i32) -> Self {
        let mut data = ExprData::new(ExprKind::Constant, vec![], Type::primitive(TypeKind::Int));
        data.value = value;
        Expression::from_data(data)
    }

    pub fn boolean(value: bool) -> Self {
        let mut data = ExprData::new(ExprKind::Constant, vec![], Type::primitive(TypeKind::Bool));
        data.value = i32::from(value);
        Expression::from_data(data)
    }

    pub fn double(value: f64) -> Self {
        let mut data =
            ExprData::new(ExprKind::Constant, vec![], Type::primitive(TypeKind::Double));
        data.double_value = value;
        Expression::from_data(data)
    }

    pub fn identifier(symbol: &Symbol) -> Self {
        let mut data = ExprData::new(ExprKind::Identifier, vec![], symbol.get_type());
        data.symbol = Some(symbol.clone());
        Expression::from_data(data)
    }

    pub fn deadlock() -> Self {
        Expression::from_data(ExprData::new(
            ExprKind::Deadlock,
            vec![],
            Type::primitive(TypeKind::Constraint),
        ))
    }

    pub fn exit() -> Self {
        Expression::from_data(ExprData::new(ExprKind::Exit, vec![], Type::unknown()))
    }

    pub fn unary(kind: ExprKind, operand: Expression) -> Self {
        Expression::nary(kind, vec![operand])
    }

    pub fn binary(kind: ExprKind, left: Expression, right: Expression) -> Self {
        Expression::nary(kind, vec![left, right])
    }

    pub fn ternary(kind: ExprKind, first: Expression, second: Expression, third: Expression) -> Self {
        Expression::nary(kind, vec![first, second, third])
    }

    /// An operator node whose type is left for the checker to infer.
    pub fn nary(kind: ExprKind, children: Vec<Expression>) -> Self {
        Expression::from_data(ExprData::new(kind, children, Type::unknown()))
    }

    /// A node whose type is already known when it is built.
    pub fn typed(kind: ExprKind, children: Vec<Expression>, ty: Type) -> Self {
        Expression::from_data(ExprData::new(kind, children, ty))
    }

    /// A list literal. Labelled entries name the record field they initialise.
    pub fn list(entries: Vec<(Option<&str>, Expression)>) -> Self {
        let fields = entries
            .iter()
            .map(|(label, e)| (label.unwrap_or(""), e.get_type()))
            .collect();
        let children = entries.into_iter().map(|(_, e)| e).collect();
        Expression::typed(ExprKind::List, children, Type::record(fields))
    }

    /// Field access `record.field`, typed from the record type.
    pub fn dot(record: Expression, index: usize) -> Self {
        let ty = record.get_type().get_sub_at(index);
        Expression::dot_typed(record, index, ty)
    }

    pub fn dot_typed(record: Expression, index: usize, ty: Type) -> Self {
        let mut data = ExprData::new(ExprKind::Dot, vec![record], ty);
        data.index = index;
        Expression::from_data(data)
    }

    pub fn sync(channel: Expression, sync: SyncKind) -> Self {
        let mut data = ExprData::new(ExprKind::Sync, vec![channel], Type::unknown());
        data.sync = Some(sync);
        Expression::from_data(data)
    }

    /// A call of `function`, typed with the function's return type.
    pub fn call(function: &Symbol, arguments: Vec<Expression>) -> Self {
        let result = function.get_type().get(0);
        let children = std::iter::once(Expression::identifier(function))
            .chain(arguments)
            .collect();
        Expression::typed(ExprKind::FunCall, children, result)
    }

    pub fn math(function: MathFunction, arguments: Vec<Expression>) -> Self {
        Expression::nary(ExprKind::Math(function), arguments)
    }

    /// `forall`, `exists` or `sum` over the values of `bound`.
    pub fn quantifier(kind: ExprKind, bound: &Symbol, body: Expression) -> Self {
        Expression::nary(kind, vec![Expression::identifier(bound), body])
    }

    /// Quantifier over the running instances of a dynamic template.
    pub fn dynamic_quantifier(
        kind: ExprKind,
        bound: &Symbol,
        template: Expression,
        body: Expression,
    ) -> Self {
        let ty = match kind {
            ExprKind::SumDynamic => Type::unknown(),
            _ => Type::primitive(TypeKind::Bool),
        };
        Expression::typed(kind, vec![Expression::identifier(bound), template, body], ty)
    }

    pub fn spawn(template: Expression, arguments: Vec<Expression>) -> Self {
        let children = std::iter::once(template).chain(arguments).collect();
        Expression::nary(ExprKind::Spawn, children)
    }

    pub fn numof(template: Expression) -> Self {
        Expression::nary(ExprKind::NumOf, vec![template])
    }

    pub fn at(mut self, position: Position) -> Self {
        if let Some(data) = self.0.as_mut() {
            Rc::make_mut(data).position = position;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn kind(&self) -> Option<ExprKind> {
        self.0.as_ref().map(|data| data.kind)
    }

    pub fn is(&self, kind: ExprKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn position(&self) -> Position {
        self.0
            .as_ref()
            .map(|data| data.position.clone())
            .unwrap_or_default()
    }

    pub fn size(&self) -> usize {
        self.children().len()
    }

    pub fn children(&self) -> &[Expression] {
        self.0
            .as_ref()
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child `i`, or the empty expression when absent.
    pub fn get(&self, i: usize) -> Expression {
        self.children().get(i).cloned().unwrap_or_default()
    }

    pub fn value(&self) -> i32 {
        self.0.as_ref().map(|data| data.value).unwrap_or(0)
    }

    pub fn double_value(&self) -> f64 {
        self.0.as_ref().map(|data| data.double_value).unwrap_or(0.0)
    }

    pub fn index(&self) -> usize {
        self.0.as_ref().map(|data| data.index).unwrap_or(0)
    }

    pub fn sync_kind(&self) -> Option<SyncKind> {
        self.0.as_ref().and_then(|data| data.sync)
    }

    /// The symbol an identifier node names.
    pub fn symbol(&self) -> Option<Symbol> {
        self.0.as_ref().and_then(|data| data.symbol.clone())
    }

    /// The symbol a left-hand side value refers to. For inline ifs this is
    /// the symbol of the true branch.
    pub fn get_symbol(&self) -> Option<Symbol> {
        match self.kind()? {
            ExprKind::Identifier => self.symbol(),
            ExprKind::Dot
            | ExprKind::Array
            | ExprKind::PreIncrement
            | ExprKind::PreDecrement
            | ExprKind::Sync
            | ExprKind::FunCall
            | ExprKind::Scenario => self.get(0).get_symbol(),
            ExprKind::InlineIf | ExprKind::Comma => self.get(1).get_symbol(),
            kind if kind.is_assignment() => self.get(0).get_symbol(),
            _ => None,
        }
    }

    pub fn get_type(&self) -> Type {
        self.0
            .as_ref()
            .map(|data| data.ty.borrow().clone())
            .unwrap_or_default()
    }

    pub fn set_type(&self, ty: Type) {
        if let Some(data) = &self.0 {
            *data.ty.borrow_mut() = ty;
        }
    }

    /// Empty, or an integral constant equal to 1.
    pub fn is_true(&self) -> bool {
        self.is_empty()
            || (self.is(ExprKind::Constant) && self.get_type().is_integral() && self.value() == 1)
    }

    /// Structural equality: same kinds, values and symbols all the way down.
    pub fn equal(&self, other: &Expression) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) if Rc::ptr_eq(a, b) => true,
            (Some(a), Some(b)) => {
                a.kind == b.kind
                    && a.value == b.value
                    && a.double_value.to_bits() == b.double_value.to_bits()
                    && a.index == b.index
                    && a.symbol == b.symbol
                    && a.children.len() == b.children.len()
                    && a.children.iter().zip(&b.children).all(|(x, y)| x.equal(y))
            }
            _ => false,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind().is_some_and(ExprKind::is_dynamic)
    }

    pub fn has_dynamic_sub(&self) -> bool {
        self.children()
            .iter()
            .any(|child| child.is_dynamic() || child.has_dynamic_sub())
    }

    /// True when the expression draws a random number anywhere inside.
    pub fn has_random(&self) -> bool {
        matches!(self.kind(), Some(ExprKind::Math(f)) if f.is_random())
            || self.children().iter().any(Expression::has_random)
    }

    /// Symbols a left-hand side value may refer to. Both branches of an
    /// inline if are included.
    pub fn get_symbols(&self, symbols: &mut SymbolSet) {
        let Some(kind) = self.kind() else {
            return;
        };
        match kind {
            ExprKind::Identifier => {
                if let Some(symbol) = self.symbol() {
                    symbols.insert(symbol);
                }
            }
            ExprKind::Dot
            | ExprKind::Array
            | ExprKind::PreIncrement
            | ExprKind::PreDecrement
            | ExprKind::Sync => self.get(0).get_symbols(symbols),
            ExprKind::InlineIf => {
                self.get(1).get_symbols(symbols);
                self.get(2).get_symbols(symbols);
            }
            ExprKind::Comma => self.get(1).get_symbols(symbols),
            kind if kind.is_assignment() => self.get(0).get_symbols(symbols),
            _ => {}
        }
    }

    pub fn is_reference_to(&self, symbols: &SymbolSet) -> bool {
        let mut referenced = SymbolSet::new();
        self.get_symbols(&mut referenced);
        !referenced.is_disjoint(symbols)
    }

    /// Every symbol evaluating the expression might write.
    pub fn collect_possible_writes(&self, symbols: &mut SymbolSet) {
        let Some(kind) = self.kind() else {
            return;
        };
        for child in self.children() {
            child.collect_possible_writes(symbols);
        }

        match kind {
            kind if kind.is_assignment() || kind.is_increment() => {
                self.get(0).get_symbols(symbols)
            }
            ExprKind::FunCall => {
                let Some(function) = self.get(0).get_symbol() else {
                    return;
                };
                let Some(effects) = function.as_function() else {
                    return;
                };
                symbols.extend(effects.changes().iter().cloned());

                let ty = function.get_type();
                for i in 1..self.size().min(ty.size()) {
                    let parameter = ty.get(i);
                    if parameter.is(TypeKind::Ref) && !parameter.is_constant() {
                        self.get(i).get_symbols(symbols);
                    }
                }
            }
            _ => {}
        }
    }

    /// Every symbol evaluating the expression might read.
    pub fn collect_possible_reads(&self, symbols: &mut SymbolSet) {
        let Some(kind) = self.kind() else {
            return;
        };
        for child in self.children() {
            child.collect_possible_reads(symbols);
        }

        match kind {
            ExprKind::Identifier => {
                if let Some(symbol) = self.symbol() {
                    symbols.insert(symbol);
                }
            }
            ExprKind::FunCall => {
                let function = self.get(0).get_symbol();
                if let Some(effects) = function.as_ref().and_then(Symbol::as_function) {
                    symbols.extend(effects.depends().iter().cloned());
                }
            }
            _ => {}
        }
    }

    pub fn changes_any_variable(&self) -> bool {
        let mut changes = SymbolSet::new();
        self.collect_possible_writes(&mut changes);
        !changes.is_empty()
    }

    pub fn changes_variable(&self, symbols: &SymbolSet) -> bool {
        let mut changes = SymbolSet::new();
        self.collect_possible_writes(&mut changes);
        !changes.is_disjoint(symbols)
    }

    pub fn depends_on(&self, symbols: &SymbolSet) -> bool {
        let mut dependencies = SymbolSet::new();
        self.collect_possible_reads(&mut dependencies);
        !dependencies.is_disjoint(symbols)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(kind) = self.kind() else {
            return Ok(());
        };
        match kind {
            ExprKind::Constant if self.get_type().is_double() => write!(f, "{}", self.double_value()),
            ExprKind::Constant if self.get_type().is_boolean() => {
                write!(f, "{}", self.value() != 0)
            }
            ExprKind::Constant => write!(f, "{}", self.value()),
            ExprKind::Identifier => match self.symbol() {
                Some(symbol) => write!(f, "{}", symbol.name()),
                None => write!(f, "?"),
            },
            ExprKind::Deadlock => write!(f, "deadlock"),
            ExprKind::Exit => write!(f, "exit()"),
            ExprKind::Rate => write!(f, "{}'", self.get(0)),
            ExprKind::Not | ExprKind::UnaryMinus => write!(f, "{}{}", kind.symbol(), self.get(0)),
            ExprKind::Array => write!(f, "{}[{}]", self.get(0), self.get(1)),
            ExprKind::Dot => write!(f, "{}.{}", self.get(0), self.index()),
            ExprKind::InlineIf => write!(f, "({} ? {} : {})", self.get(0), self.get(1), self.get(2)),
            ExprKind::PreIncrement => write!(f, "++{}", self.get(0)),
            ExprKind::PreDecrement => write!(f, "--{}", self.get(0)),
            ExprKind::PostIncrement => write!(f, "{}++", self.get(0)),
            ExprKind::PostDecrement => write!(f, "{}--", self.get(0)),
            ExprKind::Sync => {
                let mark = match self.sync_kind() {
                    Some(SyncKind::Bang) => "!",
                    Some(SyncKind::Que) => "?",
                    _ => "",
                };
                write!(f, "{}{}", self.get(0), mark)
            }
            _ if !kind.symbol().is_empty() && self.size() == 2 => {
                write!(f, "{} {} {}", self.get(0), kind.symbol(), self.get(1))
            }
            _ => {
                let name = match kind {
                    ExprKind::Math(function) => String::from(function.name()),
                    ExprKind::FunCall => self.get(0).to_string(),
                    _ => format!("{:?}", kind),
                };
                let skip = usize::from(kind == ExprKind::FunCall);
                write!(f, "{}(", name)?;
                for (i, child) in self.children().iter().skip(skip).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}
