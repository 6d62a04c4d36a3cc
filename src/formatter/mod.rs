//! # Formatter
//!
//! Prints a [`Program`] back as rule source. The output parses back to an
//! equal tree, which is what makes `ruleflow fmt` safe to run on any file.
//!
//! ```text
//! if file size > 10 and file type == "png"
//!     then process image using ImageMagick
//!     then send notification using notification_service
//!     else then store original file
//! ```

pub mod config;
pub mod error;
pub mod visitor;

pub use config::FormatterConfig;
pub use error::FormatterError;
pub use visitor::FormatterVisitor;

use crate::ast::Program;
use crate::binder::bound::BoundProgram;

pub fn format_program(program: &Program, config: FormatterConfig) -> Result<String, FormatterError> {
    FormatterVisitor::new(config).format_program(program)
}

impl BoundProgram {
    /// Source form of the program this was bound from.
    pub fn to_source(&self) -> Result<String, FormatterError> {
        format_program(&self.source, FormatterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parse_tokens;
    use crate::ast::{
        ActionStep, Condition, ConditionalRule, Literal, Location, Operand, Operator, ServiceRef,
        Statement,
    };
    use crate::preprocessor::{Preprocessor, TokenPreprocessor};
    use crate::tokenizer::token::Tokenizer;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        let tokens =
            TokenPreprocessor::default().process(Tokenizer::new().tokenize(source).unwrap());
        parse_tokens(&tokens).unwrap()
    }

    fn comparison(attribute: &str) -> Condition {
        Condition::Comparison {
            attribute: attribute.to_string(),
            operator: Operator::EqualEqual,
            operand: Operand::Literal(Literal::Integer(1)),
            location: Location::default(),
        }
    }

    fn rule(condition: Condition) -> Program {
        Program::new(vec![Statement::Conditional(ConditionalRule {
            condition,
            then_chain: vec![ActionStep {
                verb: "go".to_string(),
                object: None,
                service: None,
                location: Location::default(),
            }],
            else_chain: None,
            location: Location::default(),
        })])
    }

    #[test]
    fn test_multiline_layout() {
        let source = "service: \"Twilio\"\n\
            if file size > 10 and uploaded to S3 == true then resize image 1.5 using ImageMagick then notify using service else then log \"skipped\"\n\
            when order status to \"shipped\" then send tracking email using \"Send Grid\"";
        let formatted = format_program(&parse(source), FormatterConfig::default()).unwrap();
        assert_eq!(
            formatted,
            "service: \"Twilio\"\n\
             if file size > 10 and uploaded to S3 == true\n    \
             then resize image 1.5 using ImageMagick\n    \
             then notify using service\n    \
             else then log \"skipped\"\n\
             when order status to \"shipped\"\n    \
             then send tracking email using \"Send Grid\"\n"
        );
    }

    #[test]
    fn test_inline_layout() {
        let source = "if a == 1 or b contains \"x\" and c < -2 then go\nthen stop";
        let formatted = format_program(&parse(source), FormatterConfig::inline()).unwrap();
        assert_eq!(
            formatted,
            "if a == 1 or b contains \"x\" and c < -2 then go then stop\n"
        );
    }

    #[test]
    fn test_formatted_source_parses_back() {
        let source = "x: 2.0\nif a >= x or b == \"q\\\"uote\" then one using Svc else then two then three\nwhen job state to false then done";
        let program = parse(source);
        for config in [FormatterConfig::default(), FormatterConfig::inline()] {
            let formatted = format_program(&program, config).unwrap();
            assert_eq!(parse(&formatted), program);
        }
    }

    #[test]
    fn test_ungroupable_condition_is_rejected() {
        let nested = Condition::and(comparison("a"), Condition::or(comparison("b"), comparison("c")));
        assert!(matches!(
            format_program(&rule(nested), FormatterConfig::default()),
            Err(FormatterError::Unrepresentable(_))
        ));

        let right_leaning =
            Condition::or(comparison("a"), Condition::or(comparison("b"), comparison("c")));
        assert!(format_program(&rule(right_leaning), FormatterConfig::default()).is_err());

        let precedence_ok =
            Condition::or(comparison("a"), Condition::and(comparison("b"), comparison("c")));
        assert!(format_program(&rule(precedence_ok), FormatterConfig::default()).is_ok());
    }

    #[test]
    fn test_capitalised_service_variable_is_rejected() {
        let mut program = rule(comparison("a"));
        if let Statement::Conditional(rule) = &mut program.statements[0] {
            rule.then_chain[0].service = Some(ServiceRef::Variable("Pager".to_string()));
        }
        assert_eq!(
            format_program(&program, FormatterConfig::default()),
            Err(FormatterError::Unrepresentable(
                "service variable `Pager`".to_string()
            ))
        );
    }
}
