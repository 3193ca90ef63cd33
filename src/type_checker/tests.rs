//! Unit tests for the type checker: expression classification, the
//! compatibility relations, declarations, rates, statements and queries.

use pretty_assertions::assert_eq;

use crate::{
    ast::{
        expressions::{ExprKind, Expression, MathFunction},
        statements::{BlockStmt, Stmt},
        symbols::{Frame, Symbol},
        types::{Type, TypeKind},
    },
    system::system::{Declaration, Function, System, Template},
};

use super::{
    compatibility::{
        are_assignment_compatible, are_equivalent, channel_capability, is_lvalue, is_modifiable_lvalue,
        is_parameter_compatible, is_same_scalar_type,
    },
    declarations::valid_return_type,
    rate_decomposer::RateDecomposer,
    type_checker::TypeChecker,
};

fn int() -> Type {
    Type::primitive(TypeKind::Int)
}

fn clock() -> Type {
    Type::primitive(TypeKind::Clock)
}

fn double() -> Type {
    Type::primitive(TypeKind::Double)
}

fn chan() -> Type {
    Type::primitive(TypeKind::Channel)
}

fn bounded(lower: i32, upper: i32) -> Type {
    Type::range(int(), Expression::constant(lower), Expression::constant(upper))
}

fn var(name: &str, ty: Type) -> Symbol {
    Symbol::variable(name, ty, Expression::empty())
}

fn id(symbol: &Symbol) -> Expression {
    Expression::identifier(symbol)
}

fn num(value: i32) -> Expression {
    Expression::constant(value)
}

fn bin(kind: ExprKind, left: Expression, right: Expression) -> Expression {
    Expression::binary(kind, left, right)
}

fn error_names(system: &System) -> Vec<String> {
    system
        .errors()
        .iter()
        .map(|e| e.get_error_name().to_string())
        .collect()
}

fn warning_names(system: &System) -> Vec<String> {
    system
        .warnings()
        .iter()
        .map(|w| w.get_warning_name().to_string())
        .collect()
}

/// Checks `expr` against an empty system and returns the inferred kind.
fn classify(expr: &Expression) -> Option<TypeKind> {
    let system = System::new();
    let checker = TypeChecker::new(&system);
    assert!(checker.check_expression(expr), "{:?}", error_names(&system));
    expr.get_type().kind()
}

/// Checks `expr` and returns the names of the errors it produced.
fn errors_of(expr: &Expression) -> Vec<String> {
    let system = System::new();
    let checker = TypeChecker::new(&system);
    checker.check_expression(expr);
    error_names(&system)
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(classify(&bin(ExprKind::Plus, num(2), num(3))), Some(TypeKind::Int));
    assert_eq!(classify(&bin(ExprKind::Mod, num(7), num(2))), Some(TypeKind::Int));
    assert_eq!(classify(&bin(ExprKind::And, num(1), num(0))), Some(TypeKind::Bool));
}

#[test]
fn test_clock_arithmetic() {
    let c = var("c", clock());
    let d = var("d", clock());

    assert_eq!(classify(&bin(ExprKind::Plus, id(&c), num(1))), Some(TypeKind::Clock));
    assert_eq!(classify(&bin(ExprKind::Minus, id(&c), id(&d))), Some(TypeKind::Diff));
    assert_eq!(
        classify(&bin(ExprKind::Mult, id(&c), Expression::double(0.5))),
        Some(TypeKind::Double)
    );
}

#[test]
fn test_clock_comparisons() {
    let c = var("c", clock());
    let d = var("d", clock());

    assert_eq!(classify(&bin(ExprKind::Lt, id(&c), num(5))), Some(TypeKind::Invariant));
    assert_eq!(classify(&bin(ExprKind::Ge, num(5), id(&c))), Some(TypeKind::Invariant));
    assert_eq!(classify(&bin(ExprKind::Eq, id(&c), num(5))), Some(TypeKind::Guard));
    assert_eq!(classify(&bin(ExprKind::Neq, id(&c), num(5))), Some(TypeKind::Constraint));

    let difference = bin(ExprKind::Minus, id(&c), id(&d));
    assert_eq!(classify(&bin(ExprKind::Le, difference, num(3))), Some(TypeKind::Invariant));
}

#[test]
fn test_integer_comparison_is_boolean() {
    let x = var("x", int());
    assert_eq!(classify(&bin(ExprKind::Eq, id(&x), num(5))), Some(TypeKind::Bool));
    assert_eq!(classify(&bin(ExprKind::Lt, id(&x), num(5))), Some(TypeKind::Bool));
}

#[test]
fn test_rates() {
    let c = var("c", clock());
    let cost = var("cost", Type::primitive(TypeKind::Cost));

    let stopped = bin(ExprKind::Eq, Expression::unary(ExprKind::Rate, id(&c)), num(0));
    assert_eq!(classify(&stopped), Some(TypeKind::InvariantWeak));

    let invariant = bin(
        ExprKind::And,
        bin(ExprKind::Le, id(&c), num(10)),
        bin(ExprKind::Eq, Expression::unary(ExprKind::Rate, id(&cost)), num(2)),
    );
    assert_eq!(classify(&invariant), Some(TypeKind::InvariantWeak));
}

#[test]
fn test_conjunction_takes_weakest_marker() {
    let c = var("c", clock());
    let guard = bin(
        ExprKind::And,
        bin(ExprKind::Lt, id(&c), num(5)),
        bin(ExprKind::Eq, id(&c), num(2)),
    );
    assert_eq!(classify(&guard), Some(TypeKind::Guard));

    let constraint = bin(
        ExprKind::And,
        bin(ExprKind::Lt, id(&c), num(5)),
        bin(ExprKind::Neq, id(&c), num(2)),
    );
    assert_eq!(classify(&constraint), Some(TypeKind::Constraint));
}

#[test]
fn test_disjunction_with_clocks() {
    let c = var("c", clock());
    let x = var("x", int());

    let mixed = bin(ExprKind::Or, id(&x), bin(ExprKind::Lt, id(&c), num(5)));
    assert_eq!(classify(&mixed), Some(TypeKind::Invariant));

    let both = bin(
        ExprKind::Or,
        bin(ExprKind::Lt, id(&c), num(5)),
        bin(ExprKind::Gt, id(&c), num(7)),
    );
    assert_eq!(classify(&both), Some(TypeKind::Constraint));
}

#[test]
fn test_quantifiers() {
    let c = var("c", clock());
    let i = Symbol::new("i", bounded(0, 3));

    let forall = Expression::quantifier(ExprKind::Forall, &i, bin(ExprKind::Lt, id(&c), num(5)));
    assert_eq!(classify(&forall), Some(TypeKind::Invariant));

    let exists = Expression::quantifier(ExprKind::Exists, &i, bin(ExprKind::Lt, id(&c), num(5)));
    assert_eq!(classify(&exists), Some(TypeKind::Constraint));

    let sum = Expression::quantifier(ExprKind::Sum, &i, id(&i));
    assert_eq!(classify(&sum), Some(TypeKind::Int));
}

#[test]
fn test_type_error_on_invalid_operands() {
    let c = var("c", clock());
    let ch = var("ch", chan());

    let names = errors_of(&bin(ExprKind::Plus, id(&c), id(&ch)));
    assert_eq!(names, vec!["TypeError"]);
}

#[test]
fn test_errors_are_not_repeated_by_parents() {
    let ch = var("ch", chan());
    let inner = bin(ExprKind::Plus, id(&ch), num(1));
    let outer = bin(ExprKind::Plus, inner.clone(), num(2));

    assert_eq!(errors_of(&outer), vec!["TypeError"]);
    assert!(outer.get_type().is_unknown());
}

#[test]
fn test_assignment() {
    let x = var("x", int());
    let assign = bin(ExprKind::Assign, id(&x), num(1));
    assert_eq!(classify(&assign), Some(TypeKind::Int));

    let constant = var("k", int().constant());
    let names = errors_of(&bin(ExprKind::Assign, id(&constant), num(1)));
    assert_eq!(names, vec!["LeftHandSideValueExpected"]);

    let ch = var("ch", chan());
    let names = errors_of(&bin(ExprKind::Assign, id(&x), id(&ch)));
    assert_eq!(names, vec!["IncompatibleTypes"]);
}

#[test]
fn test_compound_assignment() {
    let d = var("d", double());
    let x = var("x", int());

    let names = errors_of(&bin(ExprKind::AssPlus, id(&d), num(1)));
    assert_eq!(names, vec!["IncrementOperatorNotAllowed"]);

    let names = errors_of(&bin(ExprKind::AssMult, id(&d), num(2)));
    assert_eq!(names, vec!["NonIntegerCompoundAssignment"]);

    assert_eq!(classify(&bin(ExprKind::AssMult, id(&x), num(2))), Some(TypeKind::Int));
}

#[test]
fn test_increment_needs_integer() {
    let c = var("c", clock());
    let names = errors_of(&Expression::unary(ExprKind::PostIncrement, id(&c)));
    assert_eq!(names, vec!["Expected"]);

    let x = var("x", int());
    assert_eq!(
        classify(&Expression::unary(ExprKind::PreIncrement, id(&x))),
        Some(TypeKind::Int)
    );
}

#[test]
fn test_inline_if() {
    let c = var("c", clock());
    let x = var("x", int());

    let names = errors_of(&Expression::ternary(ExprKind::InlineIf, id(&c), num(1), num(2)));
    assert_eq!(names, vec!["InlineIfConditionNotInteger"]);

    let names = errors_of(&Expression::ternary(ExprKind::InlineIf, id(&x), num(1), id(&c)));
    assert_eq!(names, vec!["IncompatibleArgumentsToInlineIf"]);

    let ok = Expression::ternary(ExprKind::InlineIf, id(&x), num(1), num(2));
    assert_eq!(classify(&ok), Some(TypeKind::Int));
}

#[test]
fn test_array_access() {
    let a = var("a", Type::array(int(), bounded(0, 3)));
    let x = var("x", int());
    let ch = var("ch", chan());

    assert_eq!(classify(&bin(ExprKind::Array, id(&a), num(1))), Some(TypeKind::Int));
    assert_eq!(errors_of(&bin(ExprKind::Array, id(&a), id(&ch))), vec!["IncompatibleType"]);
    assert_eq!(errors_of(&bin(ExprKind::Array, id(&x), num(1))), vec!["Expected"]);
}

#[test]
fn test_math_functions() {
    let sqrt = Expression::math(MathFunction::Sqrt, vec![num(2)]);
    assert_eq!(classify(&sqrt), Some(TypeKind::Double));

    let isnan = Expression::math(MathFunction::Isnan, vec![Expression::double(1.0)]);
    assert_eq!(classify(&isnan), Some(TypeKind::Bool));

    let abs = Expression::math(MathFunction::Abs, vec![Expression::double(1.5)]);
    assert_eq!(errors_of(&abs), vec!["Expected"]);
}

#[test]
fn test_exit_depends_on_template() {
    let system = System::new();
    let mut checker = TypeChecker::new(&system);

    assert!(!checker.check_expression(&Expression::exit()));
    assert_eq!(error_names(&system), vec!["Internal"]);

    system.clear_diagnostics();
    checker.template_dynamic = Some(false);
    assert!(!checker.check_expression(&Expression::exit()));
    assert_eq!(error_names(&system), vec!["ExitInStaticTemplate"]);

    system.clear_diagnostics();
    checker.template_dynamic = Some(true);
    assert!(checker.check_expression(&Expression::exit()));
    assert!(!system.has_errors());
}

#[test]
fn test_spawn() {
    let worker = Symbol::new("Worker", Type::process(vec![]));
    let stat = Symbol::new("Static", Type::process(vec![]));

    let mut system = System::new();
    let mut template = Template::new(worker.clone(), Frame::from(vec![Symbol::new("id", int())]));
    template.dynamic = true;
    system.dynamic_templates.push(template);
    system.templates.push(Template::new(stat.clone(), Frame::new()));

    let checker = TypeChecker::new(&system);

    let spawn = Expression::spawn(id(&worker), vec![num(1)]);
    assert!(checker.check_expression(&spawn));
    assert!(spawn.get_type().is_integer());

    assert!(!checker.check_expression(&Expression::spawn(id(&worker), vec![])));
    assert!(!checker.check_expression(&Expression::spawn(id(&stat), vec![])));
    assert!(!checker.check_expression(&Expression::numof(id(&stat))));
    assert_eq!(
        error_names(&system),
        vec!["WrongNumberOfArguments", "SpawnOfStaticTemplate", "NotADynamicTemplate"]
    );
}

#[test]
fn test_spawn_without_template() {
    let system = System::new();
    let checker = TypeChecker::new(&system);

    let bare = Expression::nary(ExprKind::Spawn, vec![]);
    assert!(!checker.check_expression(&bare));
    assert_eq!(error_names(&system), vec!["SpawnOfStaticTemplate"]);
}

#[test]
fn test_channel_capability() {
    let urgent = chan().prefix(TypeKind::Urgent);
    let broadcast = chan().prefix(TypeKind::Broadcast);

    assert_eq!(channel_capability(&urgent), 0);
    assert_eq!(channel_capability(&broadcast), 1);
    assert_eq!(channel_capability(&chan()), 2);
}

#[test]
fn test_parameter_compatibility() {
    let plain = var("a", chan());
    let urgent = var("u", chan().prefix(TypeKind::Urgent));
    let x = var("x", int());

    // A plain channel may be passed where an urgent one is expected, not
    // the other way round.
    assert!(is_parameter_compatible(&chan().prefix(TypeKind::Urgent), &id(&plain)));
    assert!(!is_parameter_compatible(&chan(), &id(&urgent)));

    assert!(is_parameter_compatible(&int().reference(), &id(&x)));
    assert!(!is_parameter_compatible(&int().reference(), &num(1)));
    assert!(is_parameter_compatible(&int().constant().reference(), &num(1)));
    assert!(is_parameter_compatible(&bounded(0, 3), &num(7)));
}

#[test]
fn test_assignment_compatibility() {
    assert!(are_assignment_compatible(&clock(), &double(), true));
    assert!(are_assignment_compatible(&double(), &clock(), false));
    assert!(!are_assignment_compatible(&int(), &clock(), false));
    assert!(are_assignment_compatible(&bounded(0, 3), &int(), false));
}

#[test]
fn test_equivalence() {
    assert!(are_equivalent(&bounded(0, 3), &bounded(0, 3).constant()));
    assert!(!are_equivalent(&bounded(0, 3), &bounded(0, 4)));

    let r1 = Type::record(vec![("a", int()), ("b", Type::primitive(TypeKind::Bool))]);
    let r2 = Type::record(vec![("b", Type::primitive(TypeKind::Bool)), ("a", int())]);
    assert!(are_equivalent(&r1, &r1));
    assert!(!are_equivalent(&r1, &r2));
}

#[test]
fn test_scalar_name_equivalence() {
    let scalar = Type::range(Type::primitive(TypeKind::Scalar), num(0), num(3));
    let pid = scalar.label("pid");
    let tid = scalar.label("tid");

    assert!(is_same_scalar_type(&pid, &pid.constant()));
    assert!(!is_same_scalar_type(&pid, &tid));
}

#[test]
fn test_lvalues() {
    let x = var("x", int());
    let k = var("k", int().constant());

    assert!(is_lvalue(&id(&k)));
    assert!(!is_modifiable_lvalue(&id(&k)));
    assert!(is_modifiable_lvalue(&id(&x)));
    assert!(!is_lvalue(&bin(ExprKind::Plus, id(&x), num(1))));
}

#[test]
fn test_valid_return_types() {
    assert!(valid_return_type(&int()));
    assert!(valid_return_type(&Type::record(vec![("a", int()), ("d", double())])));
    assert!(!valid_return_type(&clock()));
    assert!(!valid_return_type(&Type::array(int(), bounded(0, 1))));
}

fn type_errors(ty: &Type) -> Vec<String> {
    let system = System::new();
    let checker = TypeChecker::new(&system);
    checker.check_type(ty);
    error_names(&system)
}

#[test]
fn test_check_type() {
    assert_eq!(type_errors(&int().prefix(TypeKind::Urgent)), vec!["PrefixOnlyAllowedFor"]);
    assert_eq!(type_errors(&int().prefix(TypeKind::Broadcast)), vec!["PrefixOnlyAllowedFor"]);
    // The clock underneath is reported again as a non-constant type.
    assert_eq!(
        type_errors(&clock().constant()),
        vec!["PrefixNotAllowedForClocks", "CannotBeConstOrMeta"]
    );
    assert_eq!(type_errors(&chan().constant()), vec!["CannotBeConstOrMeta"]);
    assert_eq!(
        type_errors(&Type::primitive(TypeKind::Location).reference()),
        vec!["ReferenceNotAllowed"]
    );
    assert_eq!(type_errors(&Type::array(int(), int())), vec!["InvalidArraySize"]);
    assert_eq!(
        type_errors(&Type::record(vec![("d", double())])),
        vec!["NotAllowedInsideStruct"]
    );
    assert_eq!(
        type_errors(&Type::range(clock(), num(0), num(1))),
        vec!["RangeNotAllowed"]
    );

    assert!(type_errors(&chan().prefix(TypeKind::Urgent)).is_empty());
    assert!(type_errors(&Type::array(clock(), bounded(0, 3)).prefix(TypeKind::Hybrid)).is_empty());
    assert!(type_errors(&Type::record(vec![("a", bounded(0, 3))]).constant()).is_empty());
}

#[test]
fn test_range_bounds_must_be_constant() {
    let x = var("x", int());
    let ty = Type::range(int(), num(0), id(&x));
    assert_eq!(type_errors(&ty), vec!["MustBeComputableAtCompileTime"]);
}

fn initialise(ty: &Type, init: &Expression) -> (Expression, Vec<String>) {
    let system = System::new();
    let checker = TypeChecker::new(&system);
    assert!(checker.check_expression(init));
    let result = checker.check_initialiser(ty, init);
    (result, error_names(&system))
}

fn point() -> Type {
    Type::record(vec![("a", int()), ("b", Type::primitive(TypeKind::Bool))])
}

#[test]
fn test_array_initialiser() {
    let ty = Type::array(int(), bounded(0, 2));
    let init = Expression::list(vec![(None, num(1)), (None, num(2)), (None, num(3))]);

    let (result, errors) = initialise(&ty, &init);
    assert!(errors.is_empty());
    assert_eq!(result.size(), 3);
    assert!(result.get_type().is_array());

    let labelled = Expression::list(vec![(Some("a"), num(1))]);
    let (_, errors) = initialise(&ty, &labelled);
    assert_eq!(errors, vec!["FieldNameInArrayInitialiser"]);
}

#[test]
fn test_record_initialiser_is_reordered() {
    let init = Expression::list(vec![
        (Some("b"), Expression::boolean(true)),
        (Some("a"), num(7)),
    ]);

    let (result, errors) = initialise(&point(), &init);
    assert!(errors.is_empty());
    assert_eq!(result.get(0).value(), 7);
    assert!(result.get(1).get_type().is_boolean());
    assert!(result.get_type().is_record());
}

#[test]
fn test_record_initialiser_errors() {
    let incomplete = Expression::list(vec![(Some("a"), num(1))]);
    assert_eq!(initialise(&point(), &incomplete).1, vec!["IncompleteInitialiser"]);

    let duplicate = Expression::list(vec![
        (Some("a"), num(1)),
        (None, Expression::boolean(false)),
        (Some("a"), num(2)),
    ]);
    let (result, errors) = initialise(&point(), &duplicate);
    assert_eq!(errors, vec!["MultipleInitialisersForField"]);
    assert_eq!(result.get(0).value(), 1);

    let unknown = Expression::list(vec![(Some("c"), num(1))]);
    assert_eq!(
        initialise(&point(), &unknown).1,
        vec!["UnknownField", "IncompleteInitialiser"]
    );

    let too_many = Expression::list(vec![(None, num(1)), (None, Expression::boolean(true)), (None, num(3))]);
    assert_eq!(initialise(&point(), &too_many).1, vec!["TooManyElementsInInitialiser"]);
}

#[test]
fn test_invalid_initialiser() {
    let ch = var("ch", chan());
    assert_eq!(initialise(&int(), &id(&ch)).1, vec!["InvalidInitialiser"]);
}

fn checked(expr: Expression) -> Expression {
    let system = System::new();
    let checker = TypeChecker::new(&system);
    assert!(checker.check_expression(&expr));
    expr
}

#[test]
fn test_rate_decomposition() {
    let c = var("c", clock());
    let cost = var("cost", Type::primitive(TypeKind::Cost));
    let bound = bin(ExprKind::Le, id(&c), num(10));
    let invariant = checked(bin(
        ExprKind::And,
        bound.clone(),
        bin(ExprKind::Eq, Expression::unary(ExprKind::Rate, id(&cost)), num(2)),
    ));

    let mut decomposer = RateDecomposer::new();
    decomposer.decompose(&invariant);

    assert!(decomposer.invariant.equal(&bound));
    assert_eq!(decomposer.cost_rate.value(), 2);
    assert_eq!(decomposer.count_cost_rates, 1);
    assert!(!decomposer.has_clock_rates);
    assert!(!decomposer.has_strict_invariant);
}

#[test]
fn test_clock_rates_stay_in_invariant() {
    let c = var("c", clock());
    let d = var("d", clock());
    let invariant = checked(bin(
        ExprKind::And,
        bin(ExprKind::Lt, id(&d), num(3)),
        bin(ExprKind::Eq, Expression::unary(ExprKind::Rate, id(&c)), num(0)),
    ));

    let mut decomposer = RateDecomposer::new();
    decomposer.decompose(&invariant);

    assert!(decomposer.has_clock_rates);
    assert!(decomposer.has_strict_invariant);
    assert!(decomposer.cost_rate.is_empty());
    assert!(decomposer.invariant.is(ExprKind::And));
    assert!(decomposer.invariant.get_type().is(TypeKind::InvariantWeak));
}

#[test]
fn test_trivial_invariant_is_replaced() {
    let c = var("c", clock());
    let invariant = checked(bin(ExprKind::Le, id(&c), num(4)));

    let mut decomposer = RateDecomposer::new();
    assert!(decomposer.invariant.is_true());
    decomposer.decompose(&invariant);
    assert!(decomposer.invariant.equal(&invariant));
}

fn property_errors(system: &System, property: &Expression) -> Vec<String> {
    let checker = TypeChecker::new(system);
    checker.check_property(property);
    error_names(system)
}

#[test]
fn test_reachability_property() {
    let c = var("c", clock());
    let query = Expression::unary(ExprKind::EF, bin(ExprKind::Lt, id(&c), num(5)));

    let system = System::new();
    assert!(property_errors(&system, &query).is_empty());
    assert!(query.get_type().is(TypeKind::Formula));
}

#[test]
fn test_nested_path_quantifiers() {
    let x = var("x", int());
    let query = Expression::unary(ExprKind::AG, Expression::unary(ExprKind::EF, id(&x)));

    let system = System::new();
    assert_eq!(property_errors(&system, &query), vec!["NestedPathQuantifiers"]);
}

#[test]
fn test_property_side_effects() {
    let x = var("x", int());
    let query = Expression::unary(ExprKind::EF, bin(ExprKind::Assign, id(&x), num(1)));

    let system = System::new();
    assert_eq!(property_errors(&system, &query), vec!["MustBeSideEffectFree"]);
}

fn proba(kind: ExprKind, until: Expression) -> Expression {
    let c = var("c", clock());
    Expression::nary(
        kind,
        vec![num(-1), num(0), num(100), bin(ExprKind::Lt, id(&c), num(5)), until],
    )
}

#[test]
fn test_probability_box_until_must_be_false() {
    let system = System::new();
    assert!(property_errors(&system, &proba(ExprKind::ProbaBox, num(0))).is_empty());
    assert_eq!(
        property_errors(&system, &proba(ExprKind::ProbaBox, num(1))),
        vec!["MustBeFalse"]
    );
}

#[test]
fn test_probability_query_arity() {
    let query = Expression::nary(ExprKind::ProbaDiamond, vec![num(1), num(0)]);
    let system = System::new();
    assert_eq!(property_errors(&system, &query), vec!["ArityBug"]);
}

#[test]
fn test_observation_bounds() {
    let c = var("c", clock());
    let observations = Expression::list(vec![(None, bin(ExprKind::Lt, num(5), id(&c)))]);
    let query = bin(ExprKind::PoControl, observations, bin(ExprKind::Lt, id(&c), num(10)));

    let system = System::new();
    assert_eq!(property_errors(&system, &query), vec!["ObservationBounds"]);
}

fn function(name: &str, ty: Type, frame: Frame, body: Vec<Stmt>) -> (Symbol, Function) {
    let uid = Symbol::function(name, ty);
    let function = Function::new(uid.clone(), BlockStmt::new(frame, body));
    (uid, function)
}

fn check_globals(globals: Vec<Declaration>) -> System {
    let mut system = System::new();
    system.globals = globals;
    TypeChecker::new(&system).check_system();
    system
}

#[test]
fn test_function_effects_exclude_locals() {
    let x = var("x", int());
    let mut frame = Frame::new();
    let local = frame.add(Symbol::variable("l", int(), num(0)));
    let (uid, g) = function(
        "g",
        Type::function(Type::primitive(TypeKind::Void), vec![]),
        frame,
        vec![
            Stmt::expression(bin(ExprKind::Assign, id(&x), num(1))),
            Stmt::expression(bin(ExprKind::Assign, id(&local), num(2))),
        ],
    );

    let system = check_globals(vec![Declaration::Variable(x.clone()), Declaration::Function(g)]);
    assert!(!system.has_errors());

    let effects = uid.as_function().unwrap();
    assert!(effects.changes().contains(&x));
    assert!(!effects.changes().contains(&local));
}

#[test]
fn test_function_depends_exclude_parameters() {
    let x = var("x", int());
    let mut frame = Frame::new();
    let p = frame.add(Symbol::new("p", int()));
    let (uid, h) = function(
        "h",
        Type::function(int(), vec![int()]),
        frame,
        vec![Stmt::ret(bin(ExprKind::Plus, id(&p), id(&x)))],
    );

    let system = check_globals(vec![Declaration::Variable(x.clone()), Declaration::Function(h)]);
    assert!(!system.has_errors());

    let effects = uid.as_function().unwrap();
    assert!(effects.depends().contains(&x));
    assert!(!effects.depends().contains(&p));
}

#[test]
fn test_return_value_must_match() {
    let c = var("c", clock());
    let (_, f) = function("f", Type::function(int(), vec![]), Frame::new(), vec![Stmt::ret(id(&c))]);

    let system = check_globals(vec![Declaration::Variable(c), Declaration::Function(f)]);
    assert_eq!(error_names(&system), vec!["IncompatibleArgument"]);
}

#[test]
fn test_invalid_return_type() {
    let (_, f) = function("f", Type::function(clock(), vec![]), Frame::new(), vec![]);
    let system = check_globals(vec![Declaration::Function(f)]);
    assert_eq!(error_names(&system), vec!["InvalidReturnType"]);
}

#[test]
fn test_statement_conditions() {
    let c = var("c", clock());
    let x = var("x", int());
    let (_, f) = function(
        "f",
        Type::function(Type::primitive(TypeKind::Void), vec![]),
        Frame::new(),
        vec![
            Stmt::while_loop(id(&c), Stmt::Empty),
            Stmt::if_else(id(&x), Stmt::Empty, None),
            Stmt::assert(Expression::unary(ExprKind::PostIncrement, id(&x))),
        ],
    );

    let system = check_globals(vec![
        Declaration::Variable(c),
        Declaration::Variable(x),
        Declaration::Function(f),
    ]);
    assert_eq!(error_names(&system), vec!["Expected", "MustBeSideEffectFree"]);
}

#[test]
fn test_iteration_needs_range() {
    let (_, f) = function(
        "f",
        Type::function(Type::primitive(TypeKind::Void), vec![]),
        Frame::new(),
        vec![
            Stmt::iteration(Symbol::new("i", int()), Frame::new(), Stmt::Empty),
            Stmt::iteration(Symbol::new("j", bounded(0, 3)), Frame::new(), Stmt::Empty),
            Stmt::iteration(Symbol::new("k", clock()), Frame::new(), Stmt::Empty),
        ],
    );

    let system = check_globals(vec![Declaration::Function(f)]);
    let messages: Vec<String> = system.errors().iter().map(|e| e.get_message()).collect();
    assert_eq!(messages, vec!["range expected", "scalar set or integer expected"]);
}

#[test]
fn test_useless_expression_statement() {
    let x = var("x", int());
    let (_, f) = function(
        "f",
        Type::function(Type::primitive(TypeKind::Void), vec![]),
        Frame::new(),
        vec![Stmt::expression(bin(ExprKind::Plus, id(&x), num(1)))],
    );

    let system = check_globals(vec![Declaration::Variable(x), Declaration::Function(f)]);
    assert!(!system.has_errors());
    assert_eq!(warning_names(&system), vec!["ExpressionHasNoEffect"]);
}

#[test]
fn test_dynamic_constructs_outside_edges() {
    let worker = Symbol::new("Worker", Type::process(vec![]));
    let (_, f) = function(
        "f",
        Type::function(Type::primitive(TypeKind::Void), vec![]),
        Frame::new(),
        vec![Stmt::expression(Expression::spawn(id(&worker), vec![]))],
    );

    let mut system = System::new();
    let mut template = Template::new(worker.clone(), Frame::new());
    template.dynamic = true;
    system.dynamic_templates.push(template);
    system.globals.push(Declaration::Function(f));

    TypeChecker::new(&system).check_system();
    assert_eq!(error_names(&system), vec!["DynamicOutsideEdge"]);
}

#[test]
fn test_local_initialisers() {
    let x = var("x", int());
    let mut frame = Frame::new();
    let local = frame.add(Symbol::variable(
        "l",
        point(),
        Expression::list(vec![(Some("b"), Expression::boolean(true)), (Some("a"), num(3))]),
    ));
    frame.add(Symbol::variable(
        "m",
        int(),
        Expression::unary(ExprKind::PostIncrement, id(&x)),
    ));
    let (_, f) = function(
        "f",
        Type::function(Type::primitive(TypeKind::Void), vec![]),
        frame,
        vec![],
    );

    let system = check_globals(vec![Declaration::Variable(x), Declaration::Function(f)]);
    assert_eq!(error_names(&system), vec!["MustBeSideEffectFree"]);

    let init = local.as_variable().unwrap().initialiser();
    assert_eq!(init.get(0).value(), 3);
}
