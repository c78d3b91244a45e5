use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Comparison applied between a source element's value and a condition's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    StartsWith,
    EndsWith,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 10] = [
        ConditionOperator::Equals,
        ConditionOperator::NotEquals,
        ConditionOperator::Contains,
        ConditionOperator::NotContains,
        ConditionOperator::GreaterThan,
        ConditionOperator::LessThan,
        ConditionOperator::IsEmpty,
        ConditionOperator::IsNotEmpty,
        ConditionOperator::StartsWith,
        ConditionOperator::EndsWith,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "not_contains",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::IsEmpty => "is_empty",
            ConditionOperator::IsNotEmpty => "is_not_empty",
            ConditionOperator::StartsWith => "starts_with",
            ConditionOperator::EndsWith => "ends_with",
        }
    }

    /// Emptiness checks ignore the operand.
    pub fn takes_operand(&self) -> bool {
        !matches!(
            self,
            ConditionOperator::IsEmpty | ConditionOperator::IsNotEmpty
        )
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|operator| operator.as_str() == normalized)
            .ok_or_else(|| format!("unknown condition operator '{value}'"))
    }
}

/// How the per-condition results of one element are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShowWhen {
    #[default]
    All,
    Any,
}

impl FromStr for ShowWhen {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ShowWhen::All),
            "any" => Ok(ShowWhen::Any),
            other => Err(format!("unknown show-when mode '{other}'")),
        }
    }
}

/// Visibility predicate over another element's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: String,
    pub source_element_id: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: String,
}
