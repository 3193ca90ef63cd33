//! Unit tests for diagnostics.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip, Warning, WarningImpl, TYPECHECKING};
use crate::Position;

#[test]
fn test_error_creation() {
    let error = Error::new(ErrorImpl::IncompatibleTypes, Position::new(10, "test.xml"));

    assert_eq!(error.get_error_name(), "IncompatibleTypes");
    assert_eq!(error.get_message(), "incompatible types");
}

#[test]
fn test_error_position_and_context() {
    let error = Error::new(ErrorImpl::UnknownField, Position::new(42, "test.xml"));

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_context(), TYPECHECKING);
    assert_eq!(error.to_string(), "test.xml:42 (typechecking): unknown field");
}

#[test]
fn test_side_effect_message() {
    let error = Error::new(
        ErrorImpl::MustBeSideEffectFree { subject: "guard" },
        Position::null(),
    );

    assert_eq!(error.get_error_name(), "MustBeSideEffectFree");
    assert_eq!(error.get_message(), "guard must be side-effect free");
}

#[test]
fn test_cannot_be_used_as_message() {
    let error = Error::new(
        ErrorImpl::CannotBeUsedAs {
            type_: String::from("double"),
            role: "an invariant",
        },
        Position::null(),
    );

    assert_eq!(
        error.get_message(),
        "expression of type double cannot be used as an invariant"
    );
}

#[test]
fn test_arity_bug_has_tip() {
    let error = Error::new(ErrorImpl::ArityBug, Position::null());

    assert_eq!(error.get_message(), "bug: wrong number of arguments");
    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(_)));
}

#[test]
fn test_wrong_number_of_arguments_tip() {
    let error = Error::new(
        ErrorImpl::WrongNumberOfArguments {
            expected: 2,
            received: 3,
        },
        Position::null(),
    );

    assert_eq!(error.get_tip().to_string(), "Expected 2 arguments, received 3");
}

#[test]
fn test_plain_error_has_no_tip() {
    let error = Error::new(ErrorImpl::IncompleteInitialiser, Position::null());

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.get_tip().to_string(), "");
}

#[test]
fn test_warning_creation() {
    let warning = Warning::new(WarningImpl::ClockGuardOnUrgentEdge, Position::new(3, "m"));

    assert_eq!(warning.get_warning_name(), "ClockGuardOnUrgentEdge");
    assert_eq!(warning.get_message(), "clock guards are not allowed on urgent edges");
    assert_eq!(warning.get_position().0, 3);
}

#[test]
fn test_warning_display() {
    let warning = Warning::new(WarningImpl::ExpressionHasNoEffect, Position::new(7, "m"));

    assert_eq!(
        warning.to_string(),
        "m:7 (typechecking): expression does not have any effect"
    );
}
