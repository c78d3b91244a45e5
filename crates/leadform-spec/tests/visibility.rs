use leadform_spec::{
    Condition, ConditionOperator, ElementType, FieldValue, FormValues, ShowWhen, new_element,
    resolve_visibility, should_show,
};

mod support;

fn condition(source: &str, operator: ConditionOperator, value: &str) -> Condition {
    Condition {
        id: format!("{source}-{operator}"),
        source_element_id: source.into(),
        operator,
        value: value.into(),
    }
}

fn values(pairs: &[(&str, FieldValue)]) -> FormValues {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

#[test]
fn follow_up_question_appears_only_for_yes() {
    let a = new_element(ElementType::RadioButtons, "a".into(), 0);
    let mut b = new_element(ElementType::ShortAnswer, "b".into(), 1);
    b.conditions.push(condition("a", ConditionOperator::Equals, "yes"));
    b.show_when = ShowWhen::All;
    let elements = vec![a, b.clone()];

    assert!(should_show(&b, &elements, &values(&[("a", "yes".into())])));
    assert!(!should_show(&b, &elements, &values(&[("a", "no".into())])));
    assert!(!should_show(&b, &elements, &FormValues::new()));
}

#[test]
fn all_requires_every_condition_any_requires_one() {
    let a = new_element(ElementType::ShortAnswer, "a".into(), 0);
    let n = new_element(ElementType::Number, "n".into(), 1);
    let mut target = new_element(ElementType::Email, "t".into(), 2);
    target.conditions = vec![
        condition("a", ConditionOperator::StartsWith, "kit"),
        condition("n", ConditionOperator::GreaterThan, "10"),
    ];
    let elements = vec![a, n, target.clone()];
    let partial = values(&[("a", "kitchen".into()), ("n", FieldValue::Number(4.0))]);
    let full = values(&[("a", "kitchen".into()), ("n", FieldValue::Number(40.0))]);

    assert!(!should_show(&target, &elements, &partial));
    assert!(should_show(&target, &elements, &full));

    target.show_when = ShowWhen::Any;
    assert!(should_show(&target, &elements, &partial));
    assert!(!should_show(&target, &elements, &values(&[("a", "bath".into())])));
}

#[test]
fn deleted_source_hides_the_element() {
    let mut orphan = new_element(ElementType::ShortAnswer, "o".into(), 0);
    orphan
        .conditions
        .push(condition("gone", ConditionOperator::IsEmpty, ""));
    let elements = vec![orphan.clone()];
    assert!(!should_show(&orphan, &elements, &FormValues::new()));
}

#[test]
fn operators_work_on_string_forms_of_values() {
    let source = new_element(ElementType::Checkboxes, "s".into(), 0);
    let mut target = new_element(ElementType::ShortAnswer, "t".into(), 1);
    let list = values(&[(
        "s",
        FieldValue::List(vec!["Option 1".into(), "Option 3".into()]),
    )]);

    let cases = [
        (ConditionOperator::Contains, "Option 3", true),
        (ConditionOperator::NotContains, "Option 2", true),
        (ConditionOperator::EndsWith, "3", true),
        (ConditionOperator::Equals, "Option 1,Option 3", true),
        (ConditionOperator::NotEquals, "Option 1", true),
        (ConditionOperator::IsNotEmpty, "", true),
        (ConditionOperator::IsEmpty, "", false),
        (ConditionOperator::LessThan, "5", false),
    ];
    for (operator, operand, expected) in cases {
        target.conditions = vec![condition("s", operator, operand)];
        let elements = vec![source.clone(), target.clone()];
        assert_eq!(
            should_show(&target, &elements, &list),
            expected,
            "{operator} {operand:?}"
        );
    }
}

#[test]
fn numeric_operators_reject_non_numbers() {
    let source = new_element(ElementType::ShortAnswer, "s".into(), 0);
    let mut target = new_element(ElementType::ShortAnswer, "t".into(), 1);
    target.conditions = vec![condition("s", ConditionOperator::LessThan, "10")];
    let elements = vec![source, target.clone()];

    assert!(should_show(&target, &elements, &values(&[("s", " 2.5 ".into())])));
    assert!(!should_show(&target, &elements, &values(&[("s", "".into())])));
    assert!(!should_show(&target, &elements, &values(&[("s", "two".into())])));
}

#[test]
fn fixture_visibility_follows_budget_answer() {
    let definition = support::fixture();
    let hidden = resolve_visibility(&definition.elements, &values(&[("budget", "no".into())]));
    assert_eq!(hidden.get("amount"), Some(&false));
    assert_eq!(hidden.get("intro"), Some(&true));
    assert_eq!(hidden.values().filter(|shown| **shown).count(), 4);

    let shown = resolve_visibility(&definition.elements, &values(&[("budget", "yes".into())]));
    assert!(shown.values().all(|visible| *visible));
}
