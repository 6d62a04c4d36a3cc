pub mod common;
pub mod condition;
pub mod statement;

pub use common::*;
pub use condition::parse_condition;
pub use statement::*;
