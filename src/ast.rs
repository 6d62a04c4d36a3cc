use core::fmt;

pub use crate::tokenizer::literal::Literal;
pub use crate::tokenizer::symbol::Operator;

/// Source position of an AST node.
///
/// Locations are carried for diagnostics only. Two locations always compare
/// equal so that structurally identical trees parsed from differently laid
/// out text are equal; assert on `(line, column)` to check a position.
#[derive(Debug, Clone, Copy, Default, Eq, serde::Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl PartialEq for Location {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

// Root AST Definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// Top-level statement of a rule program.
///
/// # Example
/// ```text
/// notification_service: "Twilio"
/// if file size > 10 then process image using ImageMagick
///     then send notification using notification_service
/// else then store original file
/// when order status to "shipped" then send tracking email using SendGrid
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment(Assignment),
    Conditional(ConditionalRule),
    EventRule(EventRule),
}

impl Statement {
    pub fn location(&self) -> Location {
        match self {
            Statement::Assignment(a) => a.location,
            Statement::Conditional(c) => c.location,
            Statement::EventRule(e) => e.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Literal,
    pub location: Location,
}

/// `if <condition> then <chain> (else then <chain>)?`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRule {
    pub condition: Condition,
    pub then_chain: Vec<ActionStep>,
    pub else_chain: Option<Vec<ActionStep>>,
    pub location: Location,
}

/// `when <subject> to <target> then <chain>`
#[derive(Debug, Clone, PartialEq)]
pub struct EventRule {
    pub subject: String,
    pub target: Literal,
    pub then_chain: Vec<ActionStep>,
    pub location: Location,
}

/// Condition tree. Leaves are comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison {
        attribute: String,
        operator: Operator,
        operand: Operand,
        location: Location,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

impl Condition {
    pub fn and(left: Condition, right: Condition) -> Self {
        Condition::Logical {
            operator: LogicalOperator::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Condition, right: Condition) -> Self {
        Condition::Logical {
            operator: LogicalOperator::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// Binding strength; `and` binds tighter than `or`.
    pub fn precedence(&self) -> u8 {
        match self {
            LogicalOperator::Or => 1,
            LogicalOperator::And => 2,
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Variable(String),
}

/// One step of a then-chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionStep {
    pub verb: String,
    pub object: Option<Literal>,
    pub service: Option<ServiceRef>,
    pub location: Location,
}

/// The `using X` qualifier of an action step.
///
/// A quoted string or a capitalised word names a service directly; any other
/// word refers to a variable holding the service name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceRef {
    Literal(String),
    Variable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_does_not_affect_equality() {
        let a = Location { line: 1, column: 1 };
        let b = Location { line: 9, column: 4 };
        assert_eq!(a, b);
    }

    #[test]
    fn test_condition_builders() {
        let leaf = || Condition::Comparison {
            attribute: "file size".into(),
            operator: Operator::Greater,
            operand: Operand::Literal(Literal::Integer(10)),
            location: Location::default(),
        };
        match Condition::or(leaf(), Condition::and(leaf(), leaf())) {
            Condition::Logical { operator, right, .. } => {
                assert_eq!(operator, LogicalOperator::Or);
                assert!(matches!(
                    *right,
                    Condition::Logical {
                        operator: LogicalOperator::And,
                        ..
                    }
                ));
            }
            other => panic!("unexpected condition: {other:?}"),
        }
    }
}
