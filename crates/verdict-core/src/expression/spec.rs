//! Expression declarations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Language identifier reserved for the embedded interpreter.
pub const EMBEDDED_LANGUAGE: &str = "el";

/// How evaluation inputs are bound to names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingNames {
    /// A single target object bound to one alias.
    Bean(String),
    /// Positional parameters bound to aliases in order.
    Parameters(Vec<String>),
}

impl BindingNames {
    /// The names, in binding order.
    pub fn names(&self) -> &[String] {
        match self {
            BindingNames::Bean(alias) => std::slice::from_ref(alias),
            BindingNames::Parameters(aliases) => aliases,
        }
    }

    /// Whether this is multi-parameter mode.
    pub fn is_parameters(&self) -> bool {
        matches!(self, BindingNames::Parameters(_))
    }
}

/// An expression, its language, and its binding names.
///
/// Serde goes through [`ExpressionAttributes`], so deserialized specs are
/// validated like declared ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExpressionAttributes", into = "ExpressionAttributes")]
pub struct ExpressionSpec {
    expression: String,
    language: String,
    bindings: BindingNames,
}

impl ExpressionSpec {
    /// Expression over a single object bound to `alias`.
    pub fn for_bean(expression: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            language: EMBEDDED_LANGUAGE.to_string(),
            bindings: BindingNames::Bean(alias.into()),
        }
    }

    /// Expression over positional parameters bound to `aliases`.
    ///
    /// Aliases must be non-empty and distinct.
    pub fn for_parameters<I, S>(
        expression: impl Into<String>,
        aliases: I,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();
        check_names(&aliases)?;
        Ok(Self {
            expression: expression.into(),
            language: EMBEDDED_LANGUAGE.to_string(),
            bindings: BindingNames::Parameters(aliases),
        })
    }

    /// Evaluate with the named language instead of the embedded interpreter.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn bindings(&self) -> &BindingNames {
        &self.bindings
    }

    /// Whether the embedded interpreter handles this expression.
    pub fn is_embedded(&self) -> bool {
        self.language == EMBEDDED_LANGUAGE
    }
}

fn check_names(names: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if name.is_empty() {
            return Err(ConfigError::EmptyBindingName);
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::DuplicateBindingName(name.clone()));
        }
    }
    Ok(())
}

fn default_language() -> String {
    EMBEDDED_LANGUAGE.to_string()
}

/// Declaration-layer form of an expression constraint.
///
/// Exactly one of `beanAlias` and `parameterAliases` must be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpressionAttributes {
    /// Expression source.
    pub expression: String,
    /// Language identifier.
    #[serde(default = "default_language")]
    pub language: String,
    /// Alias for the validated object.
    #[serde(default)]
    pub bean_alias: Option<String>,
    /// Aliases for validated parameters.
    #[serde(default)]
    pub parameter_aliases: Option<Vec<String>>,
}

impl TryFrom<ExpressionAttributes> for ExpressionSpec {
    type Error = ConfigError;

    fn try_from(attrs: ExpressionAttributes) -> Result<Self, Self::Error> {
        let spec = match (attrs.bean_alias, attrs.parameter_aliases) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingBindings),
            (None, None) => return Err(ConfigError::MissingBindings),
            (Some(alias), None) => {
                if alias.is_empty() {
                    return Err(ConfigError::EmptyBindingName);
                }
                ExpressionSpec::for_bean(attrs.expression, alias)
            }
            (None, Some(aliases)) => ExpressionSpec::for_parameters(attrs.expression, aliases)?,
        };
        Ok(spec.with_language(attrs.language))
    }
}

impl From<ExpressionSpec> for ExpressionAttributes {
    fn from(spec: ExpressionSpec) -> Self {
        let (bean_alias, parameter_aliases) = match spec.bindings {
            BindingNames::Bean(alias) => (Some(alias), None),
            BindingNames::Parameters(aliases) => (None, Some(aliases)),
        };
        ExpressionAttributes {
            expression: spec.expression,
            language: spec.language,
            bean_alias,
            parameter_aliases,
        }
    }
}
