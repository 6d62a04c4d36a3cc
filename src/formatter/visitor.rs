use std::str::FromStr;

use crate::ast::{
    ActionStep, Assignment, Condition, ConditionalRule, EventRule, Literal, LogicalOperator,
    Operand, Operator, Program, ServiceRef, Statement,
};
use crate::formatter::config::FormatterConfig;
use crate::formatter::error::FormatterError;
use crate::tokenizer::keyword::Keyword;

pub struct FormatterVisitor {
    config: FormatterConfig,
    indent_level: usize,
    output: String,
}

impl FormatterVisitor {
    pub fn new(config: FormatterConfig) -> Self {
        Self {
            config,
            indent_level: 0,
            output: String::new(),
        }
    }

    pub fn format_program(&mut self, program: &Program) -> Result<String, FormatterError> {
        for statement in &program.statements {
            match statement {
                Statement::Assignment(assignment) => self.format_assignment(assignment)?,
                Statement::Conditional(rule) => self.format_conditional(rule)?,
                Statement::EventRule(rule) => self.format_event_rule(rule)?,
            }
            self.newline()?;
        }

        Ok(self.output.clone())
    }

    fn format_assignment(&mut self, assignment: &Assignment) -> Result<(), FormatterError> {
        if !is_identifier(&assignment.name) {
            return Err(FormatterError::Unrepresentable(format!(
                "assignment to `{}`",
                assignment.name
            )));
        }
        self.write(&assignment.name)?;
        self.write(": ")?;
        self.write(&assignment.value.to_string())
    }

    fn format_conditional(&mut self, rule: &ConditionalRule) -> Result<(), FormatterError> {
        self.write("if ")?;
        self.format_condition(&rule.condition)?;

        require_steps(&rule.then_chain)?;
        self.indent();
        self.format_chain(&rule.then_chain)?;
        if let Some(else_chain) = &rule.else_chain {
            self.separator()?;
            self.write("else")?;
            self.format_chain_inline(else_chain)?;
        }
        self.dedent();
        Ok(())
    }

    fn format_event_rule(&mut self, rule: &EventRule) -> Result<(), FormatterError> {
        self.write("when ")?;
        self.write(&phrase(&rule.subject, false)?)?;
        self.write(" to ")?;
        self.write(&rule.target.to_string())?;

        require_steps(&rule.then_chain)?;
        self.indent();
        self.format_chain(&rule.then_chain)?;
        self.dedent();
        Ok(())
    }

    fn format_condition(&mut self, condition: &Condition) -> Result<(), FormatterError> {
        match condition {
            Condition::Comparison {
                attribute,
                operator,
                operand,
                ..
            } => {
                self.write(&phrase(attribute, true)?)?;
                self.write(&format!(" {} ", operator))?;
                match operand {
                    Operand::Literal(literal) => self.write(&literal.to_string()),
                    Operand::Variable(name) if is_identifier(name) => self.write(name),
                    Operand::Variable(name) => Err(FormatterError::Unrepresentable(format!(
                        "operand `{}`",
                        name
                    ))),
                }
            }
            Condition::Logical {
                operator,
                left,
                right,
            } => {
                // Without grouping only left-leaning trees that respect
                // precedence survive re-parsing.
                check_grouping(*operator, left, true)?;
                check_grouping(*operator, right, false)?;
                self.format_condition(left)?;
                self.write(&format!(" {} ", operator))?;
                self.format_condition(right)
            }
        }
    }

    fn format_chain(&mut self, steps: &[ActionStep]) -> Result<(), FormatterError> {
        for step in steps {
            self.separator()?;
            self.write("then ")?;
            self.format_step(step)?;
        }
        Ok(())
    }

    /// First step stays on the `else` line.
    fn format_chain_inline(&mut self, steps: &[ActionStep]) -> Result<(), FormatterError> {
        let Some((first, rest)) = steps.split_first() else {
            return Err(FormatterError::Unrepresentable("empty chain".to_string()));
        };
        self.write(" then ")?;
        self.format_step(first)?;
        self.format_chain(rest)
    }

    fn format_step(&mut self, step: &ActionStep) -> Result<(), FormatterError> {
        self.write(&phrase(&step.verb, true)?)?;
        if let Some(object) = &step.object {
            self.write(" ")?;
            self.write(&object.to_string())?;
        }
        if let Some(service) = &step.service {
            self.write(" using ")?;
            self.write(&service_source(service)?)?;
        }
        Ok(())
    }

    fn separator(&mut self) -> Result<(), FormatterError> {
        if self.config.inline_chains {
            self.write(" ")
        } else {
            self.newline()
        }
    }

    fn write(&mut self, text: &str) -> Result<(), FormatterError> {
        self.output.push_str(text);
        Ok(())
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    fn newline(&mut self) -> Result<(), FormatterError> {
        self.output.push('\n');
        self.write(&" ".repeat(self.indent_level * self.config.indent_spaces))
    }
}

fn require_steps(steps: &[ActionStep]) -> Result<(), FormatterError> {
    if steps.is_empty() {
        return Err(FormatterError::Unrepresentable("empty chain".to_string()));
    }
    Ok(())
}

fn check_grouping(
    parent: LogicalOperator,
    child: &Condition,
    is_left: bool,
) -> Result<(), FormatterError> {
    if let Condition::Logical { operator, .. } = child {
        let fits = operator.precedence() > parent.precedence()
            || (is_left && operator.precedence() == parent.precedence());
        if !fits {
            return Err(FormatterError::Unrepresentable(format!(
                "`{}` nested under `{}` without grouping",
                operator, parent
            )));
        }
    }
    Ok(())
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    let leading = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    leading
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && Keyword::from_str(word).is_err()
        && word != Operator::Contains.as_ref()
        && word != "true"
        && word != "false"
}

/// Validates a multi-word phrase; `to` may join two words when allowed.
fn phrase(text: &str, allow_to: bool) -> Result<String, FormatterError> {
    let words: Vec<&str> = text.split(' ').collect();
    let last = words.len() - 1;
    let valid = words.iter().enumerate().all(|(i, word)| {
        is_identifier(word) || (allow_to && *word == "to" && i > 0 && i < last)
    });
    if valid {
        Ok(text.to_string())
    } else {
        Err(FormatterError::Unrepresentable(format!("phrase `{}`", text)))
    }
}

fn service_source(service: &ServiceRef) -> Result<String, FormatterError> {
    match service {
        ServiceRef::Literal(name) => {
            let bare = name.chars().next().is_some_and(char::is_uppercase) && is_identifier(name);
            Ok(if bare {
                name.clone()
            } else {
                Literal::String(name.clone()).to_string()
            })
        }
        ServiceRef::Variable(name) => {
            let lowercase = name
                .chars()
                .next()
                .is_some_and(|c| c.is_lowercase() || c == '_');
            if lowercase && is_identifier(name) {
                Ok(name.clone())
            } else {
                Err(FormatterError::Unrepresentable(format!(
                    "service variable `{}`",
                    name
                )))
            }
        }
    }
}
