//! Template catalog tests
//!
//! Registration, detail and schema updates, and placeholder discovery
//! against real stored packages.
//!
//! Run with: cargo test -p lexdraft-engine --test templates

#[path = "common/fixtures.rs"]
mod fixtures;

use fixtures::{fixture, register_docx_template, register_template, OWNER};
use lexdraft_engine::{
    EngineError, FieldDescriptor, FieldKind, NewTemplate, SelectOption, TemplateManager,
};
use pretty_assertions::assert_eq;

#[test]
fn register_and_fetch_round_trip() {
    let fx = fixture();
    let manager = TemplateManager::new(fx.templates.clone());

    let registered = manager
        .register(NewTemplate {
            title: "Engagement Letter".into(),
            description: Some("Standard client engagement".into()),
            file_path: fx.dir.path().join("engagement.docx"),
            owner_id: OWNER,
        })
        .unwrap();

    let fetched = manager.get(registered.id).unwrap();
    assert_eq!(fetched, registered);
    assert_eq!(fetched.variables_schema, None);

    assert_eq!(manager.list(Some(OWNER)).unwrap().len(), 1);
    assert!(manager.list(Some(OWNER + 1)).unwrap().is_empty());
}

#[test]
fn update_details_edits_only_what_is_given() {
    let fx = fixture();
    let manager = TemplateManager::new(fx.templates.clone());
    let template = register_template(&fx, "Notice");

    let updated = manager
        .update_details(template.id, Some("Final Notice".into()), None)
        .unwrap();
    assert_eq!(updated.title, "Final Notice");
    assert_eq!(updated.description, None);

    let updated = manager
        .update_details(template.id, None, Some("Sent before escalation".into()))
        .unwrap();
    assert_eq!(updated.title, "Final Notice");
    assert_eq!(updated.description, Some("Sent before escalation".into()));
}

#[test]
fn schema_round_trips_through_the_row() {
    let fx = fixture();
    let manager = TemplateManager::new(fx.templates.clone());
    let template = register_template(&fx, "Notice");

    assert_eq!(manager.schema(template.id).unwrap(), None);

    let mut state = FieldDescriptor::new("state");
    state.label = Some("State".into());
    state.kind = FieldKind::Select;
    state.options = vec![
        SelectOption::Bare("FL".into()),
        SelectOption::Labeled {
            label: "Georgia".into(),
            value: "GA".into(),
        },
    ];
    let fields = vec![FieldDescriptor::new("client_name"), state];

    manager.update_schema(template.id, &fields).unwrap();
    assert_eq!(manager.schema(template.id).unwrap(), Some(fields));
}

#[test]
fn missing_rows_are_not_found() {
    let fx = fixture();
    let manager = TemplateManager::new(fx.templates.clone());

    assert!(matches!(
        manager.get(99),
        Err(EngineError::TemplateNotFound(99))
    ));
    assert!(matches!(
        manager.update_schema(99, &[]),
        Err(EngineError::TemplateNotFound(99))
    ));
    assert!(matches!(
        manager.delete(99),
        Err(EngineError::TemplateNotFound(99))
    ));
}

#[test]
fn delete_removes_the_row_but_not_the_file() {
    let fx = fixture();
    let manager = TemplateManager::new(fx.templates.clone());
    let template = register_template(&fx, "Notice");

    manager.delete(template.id).unwrap();
    assert!(manager.get(template.id).is_err());
    assert!(template.file_path.exists());
}

#[test]
fn variables_come_from_the_stored_file() {
    let fx = fixture();
    let manager = TemplateManager::new(fx.templates.clone());
    let template = register_docx_template(
        &fx,
        "Lease",
        &["Rent {{rent_due}} payable by {{tenant}}", "Signed: {{tenant}}"],
    );

    assert_eq!(
        manager.variables(template.id).unwrap(),
        vec!["rent_due".to_string(), "tenant".to_string()]
    );
}

#[test]
fn variables_of_a_missing_file_are_empty() {
    let fx = fixture();
    let manager = TemplateManager::new(fx.templates.clone());
    let template = register_template(&fx, "Notice");
    std::fs::remove_file(&template.file_path).unwrap();

    assert_eq!(manager.variables(template.id).unwrap(), Vec::<String>::new());
}
