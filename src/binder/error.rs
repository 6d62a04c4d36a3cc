use thiserror::Error;

use crate::ast::Location;

/// Fatal binding problems. All of them are collected before binding gives up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("unresolved variable `{name}` at {location}: it must be assigned before use")]
    UnresolvedVariable { name: String, location: Location },

    #[error("variable `{name}` used as a service at {location} holds a {found}, expected a string")]
    UnknownServiceQualifierType {
        name: String,
        found: &'static str,
        location: Location,
    },
}

impl BindError {
    pub fn location(&self) -> Location {
        match self {
            BindError::UnresolvedVariable { location, .. }
            | BindError::UnknownServiceQualifierType { location, .. } => *location,
        }
    }
}

/// Non-fatal findings reported alongside a bound program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindWarning {
    #[error("duplicate event rule for `{subject}` to {target} at {location}, first declared at {first}")]
    DuplicateEventRule {
        subject: String,
        target: String,
        first: Location,
        location: Location,
    },

    #[error("service `{service}` at {location} is not in the service registry")]
    UnknownService { service: String, location: Location },
}

/// Every error found while binding, plus the warnings gathered on the way.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", render(.errors))]
pub struct BindErrors {
    pub errors: Vec<BindError>,
    pub warnings: Vec<BindWarning>,
}

fn render(errors: &[BindError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub type BindResult<T> = Result<T, BindErrors>;
