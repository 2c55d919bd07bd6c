use form_spec::{Form, FormElementGroup, FormElementStatus};

fn form() -> Form {
    serde_json::from_str(include_str!("fixtures/household_survey.json")).expect("deserialize")
}

fn basic(form: &Form) -> &FormElementGroup {
    form.group("feg-basic").expect("basic group")
}

fn household(form: &Form) -> &FormElementGroup {
    form.group("feg-household").expect("household group")
}

#[test]
fn form_elements_are_sorted_by_display_order() {
    let form = form();
    let ids = household(&form).form_element_ids();
    assert_eq!(
        ids,
        vec!["fe-members", "fe-member-name", "fe-member-age", "fe-address", "fe-village"]
    );

    let mut reversed = basic(&form).clone();
    reversed.form_elements.reverse();
    assert_eq!(reversed.form_element_ids(), basic(&form).form_element_ids());
}

#[test]
fn voided_elements_never_surface() {
    let form = form();
    let group = basic(&form);

    assert!(!group.form_element_ids().contains(&"fe-old-phone"));
    assert!(
        group
            .get_form_elements_of_type("Text")
            .iter()
            .all(|element| element.uuid != "fe-old-phone")
    );
    let filtered = group.filter_elements(&[FormElementStatus::new("fe-old-phone", true)]);
    assert!(filtered.is_empty());
}

#[test]
fn type_filter_matches_element_type_or_datatype() {
    let form = form();
    let group = basic(&form);

    let coded = group.get_form_elements_of_type("Coded");
    let single_select = group.get_form_elements_of_type("SingleSelect");
    let numeric = group.get_form_elements_of_type("Numeric");

    assert_eq!(coded.len(), 1);
    assert_eq!(coded[0].uuid, "fe-gender");
    assert_eq!(single_select, coded);
    assert_eq!(numeric[0].uuid, "fe-age");
    assert!(group.get_form_elements_of_type("Image").is_empty());
}

#[test]
fn filtering_leaves_the_schema_untouched() {
    let form = form();
    let group = basic(&form);
    let before = group.clone();
    let statuses = vec![
        FormElementStatus::new("fe-gender", true).with_answers_to_skip(["Other"]),
        FormElementStatus::new("fe-name", true),
    ];

    let first = group.filter_elements(&statuses);
    let second = group.filter_elements(&statuses);

    assert_eq!(first, second);
    assert_eq!(group, &before);
    assert!(std::ptr::eq(first[0].form_element, second[0].form_element));
}

#[test]
fn hidden_and_undecided_elements_are_excluded() {
    let form = form();
    let statuses = vec![
        FormElementStatus::new("fe-name", true),
        FormElementStatus::new("fe-age", false),
    ];

    let filtered = basic(&form).filter_elements(&statuses);

    let uuids = filtered.iter().map(|instance| instance.uuid()).collect::<Vec<_>>();
    assert_eq!(uuids, vec!["fe-name"]);
}

#[test]
fn unknown_elements_are_dropped_silently() {
    let form = form();
    let statuses = vec![
        FormElementStatus::new("fe-does-not-exist", true),
        FormElementStatus::new("fe-dob", true),
    ];

    let filtered = basic(&form).filter_elements(&statuses);

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].uuid(), "fe-dob");
}

#[test]
fn output_is_sorted_regardless_of_status_order() {
    let form = form();
    let statuses = vec![
        FormElementStatus::new("fe-dob", true),
        FormElementStatus::new("fe-gender", true),
        FormElementStatus::new("fe-name", true),
    ];

    let filtered = basic(&form).filter_elements(&statuses);

    let uuids = filtered.iter().map(|instance| instance.uuid()).collect::<Vec<_>>();
    assert_eq!(uuids, vec!["fe-name", "fe-gender", "fe-dob"]);
}

#[test]
fn repetition_index_only_sticks_inside_repeating_groups() {
    let form = form();
    let statuses = vec![
        FormElementStatus::new("fe-members", true).with_question_group_index(2),
        FormElementStatus::new("fe-member-name", true).with_question_group_index(1),
        FormElementStatus::new("fe-village", true).with_question_group_index(3),
    ];

    let filtered = household(&form).filter_elements(&statuses);

    let indices = filtered
        .iter()
        .map(|instance| (instance.uuid(), instance.question_group_index))
        .collect::<Vec<_>>();
    assert_eq!(
        indices,
        vec![
            ("fe-members", None),
            ("fe-member-name", Some(1)),
            ("fe-village", None),
        ]
    );
}

#[test]
fn one_instance_per_element_and_repetition() {
    let form = form();
    let statuses = vec![
        FormElementStatus::new("fe-member-name", true).with_question_group_index(0),
        FormElementStatus::new("fe-member-name", true).with_question_group_index(1),
        FormElementStatus::new("fe-member-name", true)
            .with_question_group_index(1)
            .with_answers_to_show(["ignored"]),
        FormElementStatus::new("fe-name", true),
    ];

    let filtered = household(&form).filter_elements(&statuses);

    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered[0].question_group_index, Some(0));
    assert_eq!(filtered[1].question_group_index, Some(1));
    assert!(filtered[1].answers_to_show.is_empty());
}

#[test]
fn statuses_deserialize_from_rule_output() {
    let statuses: Vec<FormElementStatus> = serde_json::from_value(serde_json::json!([
        { "uuid": "fe-gender", "visibility": true, "answersToSkip": ["Other"] },
        { "uuid": "fe-name", "visibility": false, "questionGroupIndex": 0 }
    ]))
    .expect("deserialize");

    assert_eq!(
        statuses[0],
        FormElementStatus::new("fe-gender", true).with_answers_to_skip(["Other"])
    );
    assert_eq!(statuses[1].question_group_index, Some(0));
    assert!(!statuses[1].visibility);
}
