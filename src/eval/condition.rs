//! Condition evaluation.
//!
//! Evaluation is a pure function of the bound condition, the fact lookup and
//! the current variable environment; nothing here suspends or mutates.

use crate::ast::{Location, LogicalOperator, Operator};
use crate::binder::bound::{BoundCondition, BoundOperand, ComparisonSubject};
use crate::capability::FactLookup;

use super::environment::VariableEnvironment;
use super::error::{RuntimeError, RuntimeResult};
use super::value::Value;

pub fn evaluate(
    condition: &BoundCondition,
    facts: &dyn FactLookup,
    env: &VariableEnvironment,
) -> RuntimeResult<bool> {
    match condition {
        BoundCondition::Comparison {
            subject,
            operator,
            operand,
            location,
        } => {
            let left = resolve_subject(subject, facts, env, *location)?;
            let right = resolve_operand(operand, env)?;
            let result = compare(*operator, &left, &right, *location)?;
            tracing::trace!(%left, %operator, %right, result, "comparison");
            Ok(result)
        }
        // Both operators short-circuit left to right.
        BoundCondition::Logical {
            operator,
            left,
            right,
        } => match operator {
            LogicalOperator::And => {
                Ok(evaluate(left, facts, env)? && evaluate(right, facts, env)?)
            }
            LogicalOperator::Or => {
                Ok(evaluate(left, facts, env)? || evaluate(right, facts, env)?)
            }
        },
    }
}

fn resolve_subject(
    subject: &ComparisonSubject,
    facts: &dyn FactLookup,
    env: &VariableEnvironment,
    location: Location,
) -> RuntimeResult<Value> {
    match subject {
        ComparisonSubject::Fact(attribute) => {
            facts
                .lookup(attribute)
                .ok_or_else(|| RuntimeError::UnknownFact {
                    attribute: attribute.clone(),
                    location,
                })
        }
        ComparisonSubject::Variable(name) => lookup_variable(name, env),
    }
}

fn resolve_operand(operand: &BoundOperand, env: &VariableEnvironment) -> RuntimeResult<Value> {
    match operand {
        BoundOperand::Literal(literal) => Ok(Value::from(literal)),
        BoundOperand::Variable(name) => lookup_variable(name, env),
    }
}

fn lookup_variable(name: &str, env: &VariableEnvironment) -> RuntimeResult<Value> {
    env.get(name)
        .cloned()
        .ok_or_else(|| RuntimeError::UnknownVariable {
            name: name.to_string(),
        })
}

/// Applies a comparison operator.
///
/// `==` follows the type of the right-hand operand: a numeric operand
/// compares numerically, anything else compares by text form.
/// Ordering operators need numbers on both sides. `contains` is a substring
/// test on text and a membership test on lists.
pub fn compare(
    operator: Operator,
    left: &Value,
    right: &Value,
    location: Location,
) -> RuntimeResult<bool> {
    let mismatch = || RuntimeError::TypeMismatch {
        operator: operator.to_string(),
        left: left.type_name().to_string(),
        right: right.type_name().to_string(),
        location,
    };

    match operator {
        Operator::EqualEqual => Ok(match right {
            Value::Integer(_) | Value::Float(_) => match (left.as_number(), right.as_number()) {
                (Some(l), Some(r)) => l == r,
                _ => false,
            },
            _ => left.as_text() == right.as_text(),
        }),
        Operator::Greater | Operator::GreaterEqual | Operator::Less | Operator::LessEqual => {
            let (Some(l), Some(r)) = (left.as_number(), right.as_number()) else {
                return Err(mismatch());
            };
            Ok(match operator {
                Operator::Greater => l > r,
                Operator::GreaterEqual => l >= r,
                Operator::Less => l < r,
                _ => l <= r,
            })
        }
        Operator::Contains => match left {
            Value::String(text) => Ok(text.contains(&right.as_text())),
            Value::List(items) => {
                let needle = right.as_text();
                Ok(items.iter().any(|item| item.as_text() == needle))
            }
            _ => Err(mismatch()),
        },
    }
}
