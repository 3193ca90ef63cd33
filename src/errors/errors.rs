use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// Context tag attached to every diagnostic raised by the type checker.
pub const TYPECHECKING: &str = "(typechecking)";

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
    context: &'static str,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
            context: TYPECHECKING,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_context(&self) -> &str {
        self.context
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::TypeError => "TypeError",
            ErrorImpl::InvalidType => "InvalidType",
            ErrorImpl::IncompatibleTypes => "IncompatibleTypes",
            ErrorImpl::IncompatibleType => "IncompatibleType",
            ErrorImpl::IncompatibleArgument => "IncompatibleArgument",
            ErrorImpl::IncompatibleArgumentsToInlineIf => "IncompatibleArgumentsToInlineIf",
            ErrorImpl::IncompatibleTypeForCommaExpression => "IncompatibleTypeForCommaExpression",
            ErrorImpl::InlineIfConditionNotInteger => "InlineIfConditionNotInteger",
            ErrorImpl::LeftHandSideValueExpected => "LeftHandSideValueExpected",
            ErrorImpl::IncrementOperatorNotAllowed => "IncrementOperatorNotAllowed",
            ErrorImpl::NonIntegerCompoundAssignment => "NonIntegerCompoundAssignment",
            ErrorImpl::InvalidAssignmentExpression => "InvalidAssignmentExpression",
            ErrorImpl::Expected { .. } => "Expected",
            ErrorImpl::MustBeComputableAtCompileTime => "MustBeComputableAtCompileTime",
            ErrorImpl::MustBeSideEffectFree { .. } => "MustBeSideEffectFree",
            ErrorImpl::CannotBeUsedAs { .. } => "CannotBeUsedAs",
            ErrorImpl::OnlyOneCostRateAllowed => "OnlyOneCostRateAllowed",
            ErrorImpl::InvalidArraySize => "InvalidArraySize",
            ErrorImpl::InvalidReturnType => "InvalidReturnType",
            ErrorImpl::InvalidInitialiser => "InvalidInitialiser",
            ErrorImpl::UnknownField => "UnknownField",
            ErrorImpl::TooManyElementsInInitialiser => "TooManyElementsInInitialiser",
            ErrorImpl::MultipleInitialisersForField => "MultipleInitialisersForField",
            ErrorImpl::IncompleteInitialiser => "IncompleteInitialiser",
            ErrorImpl::FieldNameInArrayInitialiser => "FieldNameInArrayInitialiser",
            ErrorImpl::PrefixOnlyAllowedFor { .. } => "PrefixOnlyAllowedFor",
            ErrorImpl::PrefixNotAllowedForClocks { .. } => "PrefixNotAllowedForClocks",
            ErrorImpl::ReferenceNotAllowed => "ReferenceNotAllowed",
            ErrorImpl::RangeNotAllowed => "RangeNotAllowed",
            ErrorImpl::CannotBeConstOrMeta => "CannotBeConstOrMeta",
            ErrorImpl::NotAllowedInsideStruct => "NotAllowedInsideStruct",
            ErrorImpl::UnboundedFreeParameter => "UnboundedFreeParameter",
            ErrorImpl::RestrictedFreeParameter => "RestrictedFreeParameter",
            ErrorImpl::ProgressGuardNotBoolean => "ProgressGuardNotBoolean",
            ErrorImpl::ProgressMeasureNotValue => "ProgressMeasureNotValue",
            ErrorImpl::AssumedIoFoundCsp => "AssumedIoFoundCsp",
            ErrorImpl::AssumedCspFoundIo => "AssumedCspFoundIo",
            ErrorImpl::CspAndIoMixed => "CspAndIoMixed",
            ErrorImpl::InvalidSumBody => "InvalidSumBody",
            ErrorImpl::SpawnOfStaticTemplate => "SpawnOfStaticTemplate",
            ErrorImpl::WrongNumberOfArguments { .. } => "WrongNumberOfArguments",
            ErrorImpl::TemplateOnlyDeclared => "TemplateOnlyDeclared",
            ErrorImpl::NotADynamicTemplate => "NotADynamicTemplate",
            ErrorImpl::ExitInStaticTemplate => "ExitInStaticTemplate",
            ErrorImpl::InvalidRunCount => "InvalidRunCount",
            ErrorImpl::ExplicitRunsNotSupported => "ExplicitRunsNotSupported",
            ErrorImpl::ProbabilityBoundExpected => "ProbabilityBoundExpected",
            ErrorImpl::MustBeFalse => "MustBeFalse",
            ErrorImpl::ArityBug => "ArityBug",
            ErrorImpl::BadPathQuantifier => "BadPathQuantifier",
            ErrorImpl::BadAggregationOperator => "BadAggregationOperator",
            ErrorImpl::DynamicInitialiser => "DynamicInitialiser",
            ErrorImpl::DynamicOutsideEdge => "DynamicOutsideEdge",
            ErrorImpl::InvalidFormula => "InvalidFormula",
            ErrorImpl::NestedPathQuantifiers => "NestedPathQuantifiers",
            ErrorImpl::ObservationBounds => "ObservationBounds",
            ErrorImpl::ClockDifferencesNotSupported => "ClockDifferencesNotSupported",
            ErrorImpl::QuantifiedMitlOutsideMitl => "QuantifiedMitlOutsideMitl",
            ErrorImpl::Internal { .. } => "Internal",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::LeftHandSideValueExpected => ErrorTip::Suggestion(String::from(
                "Only variables, array elements and record fields can be assigned",
            )),
            ErrorImpl::NonIntegerCompoundAssignment => {
                ErrorTip::Suggestion(String::from("Use `x = x op y` instead"))
            }
            ErrorImpl::MustBeComputableAtCompileTime => ErrorTip::Suggestion(String::from(
                "Only constants and free process parameters can be used here",
            )),
            ErrorImpl::WrongNumberOfArguments { expected, received } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::MultipleInitialisersForField => {
                ErrorTip::Suggestion(String::from("The first initialiser is kept"))
            }
            ErrorImpl::DynamicOutsideEdge => ErrorTip::Suggestion(String::from(
                "Move spawn, exit and numof into an edge update",
            )),
            ErrorImpl::AssumedIoFoundCsp | ErrorImpl::AssumedCspFoundIo => ErrorTip::Suggestion(
                String::from("Use either `!`/`?` or CSP synchronisation throughout the model"),
            ),
            ErrorImpl::ArityBug
            | ErrorImpl::BadPathQuantifier
            | ErrorImpl::BadAggregationOperator
            | ErrorImpl::Internal { .. } => ErrorTip::Suggestion(String::from(
                "The model was built inconsistently, this is not a user error",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.position, self.context, self.internal_error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    internal_warning: WarningImpl,
    position: Position,
    context: &'static str,
}

impl Warning {
    pub fn new(warning_impl: WarningImpl, position: Position) -> Self {
        Warning {
            internal_warning: warning_impl,
            position,
            context: TYPECHECKING,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_context(&self) -> &str {
        self.context
    }

    pub fn get_kind(&self) -> &WarningImpl {
        &self.internal_warning
    }

    pub fn get_message(&self) -> String {
        self.internal_warning.to_string()
    }

    pub fn get_warning_name(&self) -> &str {
        match &self.internal_warning {
            WarningImpl::ExpressionHasNoEffect => "ExpressionHasNoEffect",
            WarningImpl::ClockGuardOnUrgentEdge => "ClockGuardOnUrgentEdge",
            WarningImpl::NondeterministicInput => "NondeterministicInput",
            WarningImpl::GuardOnTargetInvariant => "GuardOnTargetInvariant",
            WarningImpl::StrictBoundOnUrgentEdge => "StrictBoundOnUrgentEdge",
            WarningImpl::ControllableOutput => "ControllableOutput",
            WarningImpl::UncontrollableInput => "UncontrollableInput",
            WarningImpl::CspWithRefinement => "CspWithRefinement",
            WarningImpl::StrictInvariant => "StrictInvariant",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_warning {
            WarningImpl::ClockGuardOnUrgentEdge => {
                ErrorTip::Suggestion(String::from("Urgent edges fire before time can pass"))
            }
            WarningImpl::GuardOnTargetInvariant => ErrorTip::Suggestion(String::from(
                "The receiver may violate the invariant of its target location",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.position, self.context, self.internal_warning)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("type error")]
    TypeError,
    #[error("invalid type")]
    InvalidType,
    #[error("incompatible types")]
    IncompatibleTypes,
    #[error("incompatible type")]
    IncompatibleType,
    #[error("incompatible argument")]
    IncompatibleArgument,
    #[error("incompatible arguments to inline if")]
    IncompatibleArgumentsToInlineIf,
    #[error("incompatible type for comma expression")]
    IncompatibleTypeForCommaExpression,
    #[error("first argument of inline if must be an integer")]
    InlineIfConditionNotInteger,
    #[error("left hand side value expected")]
    LeftHandSideValueExpected,
    #[error("increment operator can only be used for integers and cost variables")]
    IncrementOperatorNotAllowed,
    #[error("non-integer types must use regular assignment operator")]
    NonIntegerCompoundAssignment,
    #[error("invalid assignment expression")]
    InvalidAssignmentExpression,
    #[error("{what} expected")]
    Expected { what: &'static str },
    #[error("must be computable at compile time")]
    MustBeComputableAtCompileTime,
    #[error("{subject} must be side-effect free")]
    MustBeSideEffectFree { subject: &'static str },
    #[error("expression of type {type_} cannot be used as {role}")]
    CannotBeUsedAs { type_: String, role: &'static str },
    #[error("only one cost rate is allowed")]
    OnlyOneCostRateAllowed,
    #[error("invalid array size")]
    InvalidArraySize,
    #[error("invalid return type")]
    InvalidReturnType,
    #[error("invalid initialiser")]
    InvalidInitialiser,
    #[error("unknown field")]
    UnknownField,
    #[error("too many elements in initialiser")]
    TooManyElementsInInitialiser,
    #[error("multiple initialisers for field")]
    MultipleInitialisersForField,
    #[error("incomplete initialiser")]
    IncompleteInitialiser,
    #[error("field name not allowed in array initialiser")]
    FieldNameInArrayInitialiser,
    #[error("prefix {prefix} only allowed for {carriers}")]
    PrefixOnlyAllowedFor {
        prefix: &'static str,
        carriers: &'static str,
    },
    #[error("prefix {prefix} not allowed for clocks")]
    PrefixNotAllowedForClocks { prefix: &'static str },
    #[error("reference to this type not allowed")]
    ReferenceNotAllowed,
    #[error("range over this type not allowed")]
    RangeNotAllowed,
    #[error("this type cannot be declared const or meta")]
    CannotBeConstOrMeta,
    #[error("this type cannot be declared inside a struct")]
    NotAllowedInsideStruct,
    #[error("free process parameters must be a bounded integer or a scalar")]
    UnboundedFreeParameter,
    #[error("free process parameters must not be used directly or indirectly in an array declaration or select expression")]
    RestrictedFreeParameter,
    #[error("progress guard must evaluate to a boolean")]
    ProgressGuardNotBoolean,
    #[error("progress measure must evaluate to a value")]
    ProgressMeasureNotValue,
    #[error("assumed IO but found CSP synchronization")]
    AssumedIoFoundCsp,
    #[error("assumed CSP but found IO synchronization")]
    AssumedCspFoundIo,
    #[error("CSP and IO synchronisations cannot be mixed")]
    CspAndIoMixed,
    #[error("a sum can only be made over integer, double, invariant or guard expressions")]
    InvalidSumBody,
    #[error("appears as an attempt to spawn a non-dynamic template")]
    SpawnOfStaticTemplate,
    #[error("wrong number of arguments: expected {expected:?}, received {received:?}")]
    WrongNumberOfArguments { expected: usize, received: usize },
    #[error("template is only declared - not defined")]
    TemplateOnlyDeclared,
    #[error("not a dynamic template")]
    NotADynamicTemplate,
    #[error("exit can only be used in templates declared as dynamic")]
    ExitInStaticTemplate,
    #[error("invalid run count")]
    InvalidRunCount,
    #[error("explicit number of runs is not supported here")]
    ExplicitRunsNotSupported,
    #[error("floating point number expected as probability bound")]
    ProbabilityBoundExpected,
    #[error("must be false")]
    MustBeFalse,
    #[error("bug: wrong number of arguments")]
    ArityBug,
    #[error("bug: bad path quantifier")]
    BadPathQuantifier,
    #[error("bug: bad aggregation operator value")]
    BadAggregationOperator,
    #[error("dynamic constructions cannot be used as initialisers")]
    DynamicInitialiser,
    #[error("dynamic constructs are only allowed on edges")]
    DynamicOutsideEdge,
    #[error("property must be a valid formula")]
    InvalidFormula,
    #[error("nesting of path quantifiers is not allowed")]
    NestedPathQuantifiers,
    #[error("clock lower bound must be weak and upper bound strict")]
    ObservationBounds,
    #[error("clock differences are not supported")]
    ClockDifferencesNotSupported,
    #[error("MITL inside forall or exists in non-MITL property")]
    QuantifiedMitlOutsideMitl,
    #[error("internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarningImpl {
    #[error("expression does not have any effect")]
    ExpressionHasNoEffect,
    #[error("clock guards are not allowed on urgent edges")]
    ClockGuardOnUrgentEdge,
    #[error("SMC requires input edges to be deterministic")]
    NondeterministicInput,
    #[error("it may be needed to add a guard involving the target invariant")]
    GuardOnTargetInvariant,
    #[error("strict bounds on urgent edges may not make sense")]
    StrictBoundOnUrgentEdge,
    #[error("outputs should be uncontrollable for refinement checking")]
    ControllableOutput,
    #[error("inputs should be controllable for refinement checking")]
    UncontrollableInput,
    #[error("CSP synchronisations are incompatible with refinement checking")]
    CspWithRefinement,
    #[error("strict invariant")]
    StrictInvariant,
}
