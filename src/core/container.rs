//! Purpose: Immutable content descriptor decoded from configuration nodes.
//! Exports: `TextContainer`, `TEMPLATE_OPERATION`.
//! Role: Value handed to the content-resolution engine; either literal text or a named operation.
//! Invariants: Raw text never carries an operation or variables (enforced by the enum shape).
//! Invariants: Values are only built through the constructors below and never mutated afterwards.

use std::collections::BTreeMap;

pub const TEMPLATE_OPERATION: &str = "template";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextContainer {
    Raw(String),
    Operation {
        name: String,
        text: String,
        vars: BTreeMap<String, TextContainer>,
    },
}

impl TextContainer {
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// Operation with a text payload and no variables, e.g. `{"file": "body.json"}`.
    pub fn operation(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Operation {
            name: name.into(),
            text: text.into(),
            vars: BTreeMap::new(),
        }
    }

    pub fn template(
        name: impl Into<String>,
        text: impl Into<String>,
        vars: BTreeMap<String, TextContainer>,
    ) -> Self {
        Self::Operation {
            name: name.into(),
            text: text.into(),
            vars,
        }
    }

    /// Whether `operation` accepts the rich `{"with": .., "vars": {..}}` form.
    pub fn is_for_template(operation: &str) -> bool {
        operation == TEMPLATE_OPERATION
    }

    pub fn is_raw_text(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    pub fn operation_name(&self) -> Option<&str> {
        match self {
            Self::Raw(_) => None,
            Self::Operation { name, .. } => Some(name),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Raw(text) => text,
            Self::Operation { text, .. } => text,
        }
    }

    pub fn vars(&self) -> Option<&BTreeMap<String, TextContainer>> {
        match self {
            Self::Raw(_) => None,
            Self::Operation { vars, .. } => Some(vars),
        }
    }

    pub fn var(&self, name: &str) -> Option<&TextContainer> {
        self.vars().and_then(|vars| vars.get(name))
    }

    pub fn has_vars(&self) -> bool {
        self.vars().is_some_and(|vars| !vars.is_empty())
    }

    /// Same text and variables under a different operation name.
    ///
    /// Raw text has no operation to rename and is returned as is.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        match self {
            Self::Raw(_) => self.clone(),
            Self::Operation { text, vars, .. } => Self::Operation {
                name: name.into(),
                text: text.clone(),
                vars: vars.clone(),
            },
        }
    }
}
