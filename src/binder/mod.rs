//! # Binder
//!
//! Validates a parsed [`Program`] and turns it into an immutable
//! [`BoundProgram`]:
//!
//! * variables must be assigned textually before they are referenced
//! * `using` qualifiers are resolved to concrete service names
//! * comparison subjects are classified as variables or facts
//! * `when` rules are registered with the [`EventDispatcher`]
//!
//! Errors are accumulated. Binding either fully succeeds or returns every
//! [`BindError`] it found; warnings never block binding.

pub mod bound;
pub mod error;
pub mod scope;

use std::collections::HashMap;
use std::sync::Arc;

pub use bound::*;
pub use error::{BindError, BindErrors, BindResult, BindWarning};
pub use scope::BindScope;

use crate::ast::{
    ActionStep, Condition, ConditionalRule, EventRule, Literal, Location, Operand, Program,
    ServiceRef, Statement,
};
use crate::capability::ServiceRegistry;
use crate::event::dispatcher::{EventDispatcher, EventSubscription};

pub struct Binder<'a> {
    registry: &'a ServiceRegistry,
    scope: BindScope,
    dispatcher: EventDispatcher,
    event_keys: HashMap<(String, String), Location>,
    errors: Vec<BindError>,
    warnings: Vec<BindWarning>,
}

impl<'a> Binder<'a> {
    pub fn new(registry: &'a ServiceRegistry) -> Self {
        Self {
            registry,
            scope: BindScope::new(),
            dispatcher: EventDispatcher::new(),
            event_keys: HashMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn bind(mut self, program: Program) -> BindResult<BoundProgram> {
        let statements = program
            .statements
            .iter()
            .enumerate()
            .map(|(rule, statement)| self.bind_statement(rule, statement))
            .collect::<Vec<_>>();

        for warning in &self.warnings {
            tracing::warn!(%warning, "bind warning");
        }

        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "binding failed");
            return Err(BindErrors {
                errors: self.errors,
                warnings: self.warnings,
            });
        }

        Ok(BoundProgram {
            source: program,
            statements,
            dispatcher: self.dispatcher,
            warnings: self.warnings,
        })
    }

    fn bind_statement(&mut self, rule: RuleId, statement: &Statement) -> BoundStatement {
        match statement {
            Statement::Assignment(assignment) => {
                self.scope.assign(
                    &assignment.name,
                    assignment.value.clone(),
                    assignment.location,
                );
                BoundStatement::Assignment {
                    name: assignment.name.clone(),
                    value: assignment.value.clone(),
                }
            }
            Statement::Conditional(conditional) => self.bind_conditional(rule, conditional),
            Statement::EventRule(event) => self.bind_event_rule(rule, event),
        }
    }

    fn bind_conditional(&mut self, rule: RuleId, conditional: &ConditionalRule) -> BoundStatement {
        BoundStatement::Conditional {
            rule,
            condition: self.bind_condition(&conditional.condition),
            then_chain: Arc::new(self.bind_chain(rule, &conditional.then_chain)),
            else_chain: conditional
                .else_chain
                .as_ref()
                .map(|steps| Arc::new(self.bind_chain(rule, steps))),
        }
    }

    fn bind_event_rule(&mut self, rule: RuleId, event: &EventRule) -> BoundStatement {
        let key = (event.subject.clone(), event.target.as_text());
        if let Some(first) = self.event_keys.get(&key) {
            self.warnings.push(BindWarning::DuplicateEventRule {
                subject: event.subject.clone(),
                target: event.target.to_string(),
                first: *first,
                location: event.location,
            });
        } else {
            self.event_keys.insert(key, event.location);
        }

        let chain = Arc::new(self.bind_chain(rule, &event.then_chain));
        self.dispatcher.register(EventSubscription {
            subject: event.subject.clone(),
            target: event.target.clone(),
            chain: Arc::clone(&chain),
        });

        BoundStatement::EventRule {
            rule,
            subject: event.subject.clone(),
            target: event.target.clone(),
            chain,
        }
    }

    fn bind_condition(&mut self, condition: &Condition) -> BoundCondition {
        match condition {
            Condition::Comparison {
                attribute,
                operator,
                operand,
                location,
            } => {
                let subject = if !attribute.contains(' ') && self.scope.contains(attribute) {
                    ComparisonSubject::Variable(attribute.clone())
                } else {
                    ComparisonSubject::Fact(attribute.clone())
                };
                let operand = match operand {
                    Operand::Literal(literal) => BoundOperand::Literal(literal.clone()),
                    Operand::Variable(name) => {
                        if !self.scope.contains(name) {
                            self.errors.push(BindError::UnresolvedVariable {
                                name: name.clone(),
                                location: *location,
                            });
                        }
                        BoundOperand::Variable(name.clone())
                    }
                };
                BoundCondition::Comparison {
                    subject,
                    operator: *operator,
                    operand,
                    location: *location,
                }
            }
            Condition::Logical {
                operator,
                left,
                right,
            } => BoundCondition::Logical {
                operator: *operator,
                left: Box::new(self.bind_condition(left)),
                right: Box::new(self.bind_condition(right)),
            },
        }
    }

    fn bind_chain(&mut self, rule: RuleId, steps: &[ActionStep]) -> BoundChain {
        BoundChain {
            rule,
            steps: steps
                .iter()
                .enumerate()
                .map(|(index, step)| self.bind_step(index, step))
                .collect(),
        }
    }

    fn bind_step(&mut self, index: usize, step: &ActionStep) -> BoundStep {
        let service = step
            .service
            .as_ref()
            .and_then(|service| self.resolve_service(service, step.location));

        if let Some(name) = &service {
            if !self.registry.is_empty() && !self.registry.contains(name) {
                self.warnings.push(BindWarning::UnknownService {
                    service: name.clone(),
                    location: step.location,
                });
            }
        }

        BoundStep {
            index,
            verb: step.verb.clone(),
            object: step.object.clone(),
            service,
            location: step.location,
        }
    }

    fn resolve_service(&mut self, service: &ServiceRef, location: Location) -> Option<String> {
        match service {
            ServiceRef::Literal(name) => Some(name.clone()),
            ServiceRef::Variable(name) => match self.scope.get(name).map(|e| &e.value) {
                Some(Literal::String(resolved)) => Some(resolved.clone()),
                Some(other) => {
                    self.errors.push(BindError::UnknownServiceQualifierType {
                        name: name.clone(),
                        found: other.type_name(),
                        location,
                    });
                    None
                }
                None => {
                    self.errors.push(BindError::UnresolvedVariable {
                        name: name.clone(),
                        location,
                    });
                    None
                }
            },
        }
    }
}

/// Binds `program` against `registry`.
pub fn bind(program: Program, registry: &ServiceRegistry) -> BindResult<BoundProgram> {
    Binder::new(registry).bind(program)
}
