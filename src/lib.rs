//! # ruleflow: an automation-rule language core
//!
//! ruleflow compiles small, human-readable automation rules and executes them
//! against host-supplied capabilities:
//!
//! ```text
//! notification_service: "Twilio"
//! if file size > 10 and file type == "png"
//!     then process image using ImageMagick
//!     then send notification using notification_service
//!     else then store original file
//! when order status to "shipped"
//!     then send tracking email using SendGrid
//! ```
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source → Tokenizer → Preprocessor → Parser → Binder → Evaluator
//!                                                 └──→ Event Dispatcher
//! ```
//!
//! ### Stage 1: Tokenization
//!
//! The [`tokenizer`] module turns source text into positioned tokens and
//! reports illegal characters and unterminated literals.
//!
//! ### Stage 2: Preprocessing
//!
//! The [`preprocessor`] drops whitespace and comments and joins `then`/`else`
//! continuation lines, so that every remaining line break ends a statement.
//!
//! ### Stage 3: Parsing
//!
//! The [`analyzer`] module builds the [`ast`] with parser combinators. Parsing
//! is fail-fast: the first syntax error ends compilation.
//!
//! ### Stage 4: Binding
//!
//! The [`binder`] resolves variables and `using` qualifiers, registers `when`
//! rules with the [`event`] dispatcher, and accumulates every error it finds.
//!
//! ### Stage 5: Evaluation
//!
//! The [`eval`] module evaluates conditions against facts and runs then-chains
//! through the [`capability::ActionDispatch`] capability, one awaited step at
//! a time. [`runtime::Runtime`] ties a bound program to its capabilities and
//! exposes `run` and `ingest`.
//!
//! The core performs no I/O of its own; the `ruleflow` binary is the host that
//! reads files.

pub mod analyzer;
pub mod ast;
pub mod binder;
pub mod capability;
pub mod config;
pub mod error;
pub mod eval;
pub mod event;
pub mod formatter;
pub mod preprocessor;
pub mod runtime;
pub mod tokenizer;

use std::sync::Arc;

pub use binder::{BindError, BindErrors, BindWarning, BoundProgram};
pub use capability::{
    ActionDispatch, ActionOutput, ActionRequest, DispatchError, DryRunDispatch, FactLookup,
    ServiceRegistry,
};
pub use config::{RuntimeConfig, StepFailurePolicy};
pub use error::{CompileError, Error, RuleflowResult};
pub use eval::{RunReport, RuntimeError, Value};
pub use runtime::Runtime;

use preprocessor::{Preprocessor, TokenPreprocessor};
use tokenizer::token::Tokenizer;

/// Compiles rule source into a bound program.
///
/// Lexing and parsing stop at the first error; binding reports every error it
/// finds.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn compile(source: &str, registry: &ServiceRegistry) -> Result<BoundProgram, CompileError> {
    let tokens = Tokenizer::new().tokenize(source)?;
    let tokens = TokenPreprocessor::default().process(tokens);
    let program = analyzer::parse_tokens(&tokens)?;
    let bound = binder::bind(program, registry)?;
    tracing::debug!(
        statements = bound.statements.len(),
        subscriptions = bound.dispatcher.len(),
        "compiled"
    );
    Ok(bound)
}

/// Runs `program` once with a fresh environment.
pub async fn run(
    program: &BoundProgram,
    facts: Arc<dyn FactLookup>,
    dispatch: Arc<dyn ActionDispatch>,
) -> RunReport {
    let (report, _) = eval::Evaluator::new(facts, dispatch)
        .run(program, &eval::Cancellation::never())
        .await;
    report
}
