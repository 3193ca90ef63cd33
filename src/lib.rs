#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

pub mod ast;
pub mod errors;
pub mod system;
pub mod type_checker;

/// A source offset together with the name of the source it points into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }

    pub fn new(offset: u32, source: &str) -> Self {
        Position(offset, Rc::new(String::from(source)))
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0 && self.1.as_str() == "<null>"
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::null()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.1, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Position;

    #[test]
    fn test_null_position() {
        let position = Position::null();
        assert!(position.is_null());
        assert_eq!(position.to_string(), "<null>:0");
    }

    #[test]
    fn test_position_display() {
        let position = Position::new(42, "model.xml");
        assert!(!position.is_null());
        assert_eq!(position.to_string(), "model.xml:42");
    }
}
