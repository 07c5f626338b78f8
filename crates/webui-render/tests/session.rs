//! Level engine and change tracking.

use webui_model::{Component, FieldId, LevelCatalog, NodePath, parse_forest};
use webui_render::{FormSession, Renderer, SessionError, Transition, walk};

fn catalog() -> LevelCatalog {
    LevelCatalog::from_names(["easy", "expert", "guru"]).unwrap()
}

fn session_for(json: &str) -> FormSession {
    let forest = parse_forest(json).unwrap();
    let output = Renderer::default().render(&forest);
    FormSession::new(forest, catalog(), &output.fields)
}

fn accept() -> impl FnMut(&str) -> bool {
    |_| true
}

fn decline() -> impl FnMut(&str) -> bool {
    |_| false
}

const EXPERT_SECTION: &str = r#"[{"type": "section", "label": "Sampling", "accesslevels": ["expert"],
    "children": [{"type": "parameter", "name": "structures", "datatype": "integer", "default": 5}]}]"#;

#[test]
fn hidden_section_still_reports_default() {
    let mut session = session_for(EXPERT_SECTION);
    let section = NodePath::root(0);
    let parameter = NodePath::from(vec![0, 0]);
    let field = FieldId::from("structures");

    assert!(!session.is_visible(&section));
    assert!(session.is_visible(&parameter));
    assert!(!session.is_effectively_visible(&parameter));
    assert_eq!(session.value(&field), Some("5"));

    let transition = session
        .set_level_by_name("expert", false, &mut accept())
        .unwrap();
    assert!(matches!(transition, Transition::Applied { too_high: false, .. }));
    assert!(session.is_visible(&section));
    assert!(session.is_effectively_visible(&parameter));
}

#[test]
fn visibility_matches_level_membership() {
    let json = r#"[
        {"type": "paragraph", "text": "always"},
        {"type": "parameter", "name": "a", "datatype": "string", "accesslevels": ["easy", "guru"]},
        {"type": "parameter", "name": "b", "datatype": "string", "accesslevels": ["expert"]},
        {"type": "section", "label": "s", "accesslevels": ["guru"], "children": [
            {"type": "parameter", "name": "c", "datatype": "string"}
        ]}
    ]"#;
    let forest = parse_forest(json).unwrap();
    let mut session = session_for(json);

    for name in ["easy", "expert", "guru"] {
        session.set_level_by_name(name, true, &mut accept()).unwrap();
        let level = session.catalog().find(name).unwrap();
        let level_name = session.catalog().name(level).unwrap().clone();
        for (path, component) in walk(&forest) {
            let expected = match component.access_levels() {
                Some(levels) => levels.contains(&level_name),
                None => true,
            };
            assert_eq!(session.is_visible(&path), expected, "{path} at {name}");
        }
    }
}

#[test]
fn empty_access_level_list_is_visible_everywhere() {
    let json = r#"[{"type": "parameter", "name": "x", "datatype": "string", "accesslevels": []}]"#;
    let forest = parse_forest(json).unwrap();
    let output = Renderer::default().render(&forest);
    let element = output.fragments[0].as_element().unwrap();
    assert_eq!(element.get_attr("data-accesslevels"), None);

    let mut session = session_for(json);
    for name in ["easy", "expert", "guru"] {
        session.set_level_by_name(name, true, &mut accept()).unwrap();
        assert!(session.is_visible(&NodePath::root(0)), "hidden at {name}");
        session.edit(&FieldId::from("x"), name).unwrap();
    }
}

#[test]
fn set_level_without_force_is_idempotent() {
    let mut session = session_for(EXPERT_SECTION);
    let first = session
        .set_level_by_name("expert", false, &mut accept())
        .unwrap();
    assert!(matches!(first, Transition::Applied { .. }));
    session.edit(&FieldId::from("structures"), "8").unwrap();

    let second = session
        .set_level_by_name("expert", false, &mut accept())
        .unwrap();
    assert_eq!(second, Transition::Unchanged);
    assert!(session.form_has_changed());
    assert_eq!(session.value(&FieldId::from("structures")), Some("8"));
}

#[test]
fn declined_downgrade_keeps_level() {
    let mut session = session_for(EXPERT_SECTION);
    session
        .set_level_by_name("expert", false, &mut accept())
        .unwrap();
    session.edit(&FieldId::from("structures"), "12").unwrap();
    let expert = session.current_level();

    let mut asked = Vec::new();
    let mut prompt = |message: &str| {
        asked.push(message.to_string());
        false
    };
    let transition = session.set_level_by_name("easy", false, &mut prompt).unwrap();

    assert_eq!(transition, Transition::Declined);
    assert_eq!(asked.len(), 1);
    assert_eq!(session.current_level(), expert);
    assert_eq!(session.value(&FieldId::from("structures")), Some("12"));
    assert!(session.form_has_changed());
}

#[test]
fn accepted_downgrade_resets_change_flag() {
    let mut session = session_for(EXPERT_SECTION);
    session
        .set_level_by_name("expert", false, &mut accept())
        .unwrap();
    session.edit(&FieldId::from("structures"), "3").unwrap();
    assert!(session.form_has_changed());

    let transition = session
        .set_level_by_name("easy", false, &mut accept())
        .unwrap();
    assert!(matches!(transition, Transition::Applied { .. }));
    assert!(!session.form_has_changed());
}

#[test]
fn upgrade_does_not_prompt() {
    let mut session = session_for(EXPERT_SECTION);
    session
        .set_level_by_name("expert", false, &mut accept())
        .unwrap();
    session.edit(&FieldId::from("structures"), "3").unwrap();
    let transition = session
        .set_level_by_name("guru", false, &mut decline())
        .unwrap();
    assert!(matches!(transition, Transition::Applied { .. }));
}

#[test]
fn level_above_user_max_blocks_submission() {
    let forest = parse_forest(EXPERT_SECTION).unwrap();
    let output = Renderer::default().render(&forest);
    let catalog = catalog();
    let easy = catalog.find("easy").unwrap();
    let mut session = FormSession::new(forest, catalog, &output.fields).with_user_max(easy);

    let transition = session
        .set_level_by_name("expert", false, &mut accept())
        .unwrap();
    assert!(matches!(transition, Transition::Applied { too_high: true, .. }));
    assert!(session.submission_blocked());
    assert!(session.is_visible(&NodePath::root(0)));

    session
        .set_level_by_name("easy", false, &mut accept())
        .unwrap();
    assert!(!session.submission_blocked());
}

#[test]
fn reset_input_restores_default() {
    let mut session = session_for(EXPERT_SECTION);
    let field = FieldId::from("structures");
    session
        .set_level_by_name("expert", false, &mut accept())
        .unwrap();
    session.edit(&field, "1").unwrap();
    session.edit(&field, "2").unwrap();
    assert!(session.is_modified(&field));

    session.reset_input(&field).unwrap();
    assert_eq!(session.value(&field), Some("5"));
    assert!(!session.is_modified(&field));
}

#[test]
fn disabled_fields_reject_edits() {
    let mut session = session_for(EXPERT_SECTION);
    let err = session.edit(&FieldId::from("structures"), "9").unwrap_err();
    assert_eq!(err, SessionError::FieldDisabled("structures".to_string()));
    assert!(!session.form_has_changed());
}

#[test]
fn unknown_level_and_field_are_errors() {
    let mut session = session_for(EXPERT_SECTION);
    assert_eq!(
        session.set_level_by_name("admin", false, &mut accept()),
        Err(SessionError::UnknownLevel("admin".to_string()))
    );
    assert_eq!(
        session.reset_input(&FieldId::from("missing")),
        Err(SessionError::UnknownField("missing".to_string()))
    );
}

#[test]
fn initial_level_is_applied() {
    let forest: Vec<Component> = parse_forest(EXPERT_SECTION).unwrap();
    let output = Renderer::default().render(&forest);
    let catalog = catalog();
    let expert = catalog.find("expert").unwrap();
    let session = FormSession::new(forest, catalog, &output.fields).with_initial_level(expert);
    assert_eq!(session.current_level(), expert);
    assert!(session.is_visible(&NodePath::root(0)));
}

#[test]
fn hidden_nodes_are_marked_in_markup() {
    let forest = parse_forest(EXPERT_SECTION).unwrap();
    let mut output = Renderer::default().render(&forest);
    let session = FormSession::new(forest, catalog(), &output.fields);

    session.apply_to_markup(&mut output.fragments, true);
    let section = output.fragments[0].as_element().unwrap();
    assert!(section.has_class("disabled"));
    assert_eq!(section.get_attr("hidden"), Some("hidden"));
    let input = output.fragments[0].find_by_id("structures").unwrap();
    assert_eq!(input.get_attr("disabled"), Some("disabled"));
}
