use std::sync::Arc;

use crate::ast::{Literal, Location, LogicalOperator, Operator, Program};
use crate::event::dispatcher::EventDispatcher;

use super::error::BindWarning;

/// Index of the statement a rule was declared as.
pub type RuleId = usize;

/// Output of binding: the parsed program plus everything resolved from it.
///
/// Immutable once built; event subscriptions live exactly as long as the
/// program.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundProgram {
    /// The program as parsed, kept for pretty-printing.
    pub source: Program,
    pub statements: Vec<BoundStatement>,
    pub dispatcher: EventDispatcher,
    pub warnings: Vec<BindWarning>,
}

impl BoundProgram {
    /// Every resolved service qualifier as `(rule, step index, service)`.
    pub fn resolved_services(&self) -> Vec<(RuleId, usize, &str)> {
        let mut services = Vec::new();
        for statement in &self.statements {
            for chain in statement.chains() {
                for step in &chain.steps {
                    if let Some(service) = &step.service {
                        services.push((chain.rule, step.index, service.as_str()));
                    }
                }
            }
        }
        services
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundStatement {
    Assignment {
        name: String,
        value: Literal,
    },
    Conditional {
        rule: RuleId,
        condition: BoundCondition,
        then_chain: Arc<BoundChain>,
        else_chain: Option<Arc<BoundChain>>,
    },
    /// Registered with the dispatcher; does nothing during a run.
    EventRule {
        rule: RuleId,
        subject: String,
        target: Literal,
        chain: Arc<BoundChain>,
    },
}

impl BoundStatement {
    pub fn chains(&self) -> Vec<&BoundChain> {
        match self {
            BoundStatement::Assignment { .. } => Vec::new(),
            BoundStatement::Conditional {
                then_chain,
                else_chain,
                ..
            } => std::iter::once(then_chain.as_ref())
                .chain(else_chain.as_deref())
                .collect(),
            BoundStatement::EventRule { chain, .. } => vec![chain.as_ref()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundCondition {
    Comparison {
        subject: ComparisonSubject,
        operator: Operator,
        operand: BoundOperand,
        location: Location,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<BoundCondition>,
        right: Box<BoundCondition>,
    },
}

/// Left side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonSubject {
    /// Looked up through the fact capability.
    Fact(String),
    /// Read from the variable environment.
    Variable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundOperand {
    Literal(Literal),
    Variable(String),
}

/// An ordered then-chain with service qualifiers resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundChain {
    pub rule: RuleId,
    pub steps: Vec<BoundStep>,
}

impl BoundChain {
    pub fn verbs(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.verb.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundStep {
    pub index: usize,
    pub verb: String,
    pub object: Option<Literal>,
    pub service: Option<String>,
    pub location: Location,
}
