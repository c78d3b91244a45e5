use std::collections::BTreeMap;

use crate::spec::condition::{Condition, ConditionOperator, ShowWhen};
use crate::spec::element::FormElement;
use crate::values::{FieldValue, FormValues};

pub type VisibilityMap = BTreeMap<String, bool>;

/// Decides whether `element` is shown for the current `values`.
///
/// Elements without conditions are always shown. A condition whose source
/// element no longer exists evaluates to `false`. The per-condition results are
/// combined with AND for [`ShowWhen::All`] and OR for [`ShowWhen::Any`].
pub fn should_show(element: &FormElement, all_elements: &[FormElement], values: &FormValues) -> bool {
    if element.conditions.is_empty() {
        return true;
    }

    let mut results = element
        .conditions
        .iter()
        .map(|condition| evaluate_condition(condition, all_elements, values));

    match element.show_when {
        ShowWhen::All => results.all(|passed| passed),
        ShowWhen::Any => results.any(|passed| passed),
    }
}

/// Visibility of every element of a form, keyed by element id.
pub fn resolve_visibility(elements: &[FormElement], values: &FormValues) -> VisibilityMap {
    elements
        .iter()
        .map(|element| (element.id.clone(), should_show(element, elements, values)))
        .collect()
}

pub fn evaluate_condition(
    condition: &Condition,
    all_elements: &[FormElement],
    values: &FormValues,
) -> bool {
    let Some(source) = all_elements
        .iter()
        .find(|element| element.id == condition.source_element_id)
    else {
        return false;
    };

    let current = values
        .get(&source.id)
        .map(FieldValue::to_text)
        .unwrap_or_default();
    apply_operator(condition.operator, &current, &condition.value)
}

fn apply_operator(operator: ConditionOperator, current: &str, operand: &str) -> bool {
    match operator {
        ConditionOperator::Equals => current == operand,
        ConditionOperator::NotEquals => current != operand,
        ConditionOperator::Contains => current.contains(operand),
        ConditionOperator::NotContains => !current.contains(operand),
        ConditionOperator::StartsWith => current.starts_with(operand),
        ConditionOperator::EndsWith => current.ends_with(operand),
        ConditionOperator::IsEmpty => current.is_empty(),
        ConditionOperator::IsNotEmpty => !current.is_empty(),
        ConditionOperator::GreaterThan => compare_numbers(current, operand, |l, r| l > r),
        ConditionOperator::LessThan => compare_numbers(current, operand, |l, r| l < r),
    }
}

fn compare_numbers<F>(left: &str, right: &str, predicate: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (parse_number(left), parse_number(right)) {
        (Some(left), Some(right)) => predicate(left, right),
        _ => false,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
