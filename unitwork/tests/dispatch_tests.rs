mod common;

use common::{FailingEditHandler, Fixture, PERSON, person};
use std::rc::Rc;
use unitwork::{
    Change, ChangeSet, Command, CommandBus, CommandKind, Definition, DefinitionRepository, DispatchPolicy,
    DynamicEntity, EditCommand, EntityKey, EntityRef, EntityStatus, NewCommand, RemoveCommand, SilentBus,
    StrictBus, UnitOfWorkConfig, UowError, Value, bus_for, share,
};

fn bare_person_definition() -> Definition {
    Definition::new(PERSON, "id")
        .observe(["first_name", "last_name"])
        .unwrap()
}

// ── Command construction ─────────────────────────────────────────

#[test]
fn remove_command_from_entity_value() {
    let entity: EntityRef = person(Some(1), "a", "b");
    let command = RemoveCommand::try_from(Value::Entity(entity.clone())).unwrap();
    assert!(Rc::ptr_eq(command.entity(), &entity));
}

#[test]
fn remove_command_from_scalar_is_invalid() {
    let err = RemoveCommand::try_from(Value::from(42)).unwrap_err();
    match err {
        UowError::InvalidArgument(msg) => {
            assert!(msg.contains("remove command requires an entity"));
            assert!(msg.contains("number"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn new_command_from_list_is_invalid() {
    let err = NewCommand::try_from(Value::List(vec![])).unwrap_err();
    assert!(matches!(err, UowError::InvalidArgument(_)));
}

#[test]
fn edit_command_from_entity_value_keeps_changes() {
    let entity: EntityRef = person(Some(1), "a", "b");
    let changes = ChangeSet::new(vec![Change::scalar("first_name", "a", "c")]);
    let command = EditCommand::try_from((Value::Entity(entity.clone()), changes.clone())).unwrap();
    assert!(Rc::ptr_eq(command.entity(), &entity));
    assert_eq!(command.changes(), &changes);
}

#[test]
fn edit_command_from_scalar_is_invalid() {
    let err = EditCommand::try_from((Value::from("x"), ChangeSet::default())).unwrap_err();
    match err {
        UowError::InvalidArgument(msg) => assert!(msg.contains("edit command requires an entity")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn command_debug_names_entity_key() {
    let entity: EntityRef = person(Some(1), "a", "b");
    let key = EntityKey::of(&entity).to_string();
    let new = NewCommand::new(entity.clone());
    let remove = RemoveCommand::new(entity);
    assert!(format!("{new:?}").contains(&key));
    assert!(format!("{remove:?}").starts_with("RemoveCommand"));
}

#[test]
fn command_kind_and_changes() {
    let entity: EntityRef = person(Some(1), "a", "b");
    let edit = Command::Edit(EditCommand::new(entity.clone(), ChangeSet::default()));
    let new = Command::New(NewCommand::new(entity));

    assert_eq!(edit.kind(), CommandKind::Edit);
    assert!(edit.changes().is_some());
    assert_eq!(new.kind(), CommandKind::New);
    assert!(new.changes().is_none());
    assert_eq!(CommandKind::Remove.to_string(), "remove");
}

// ── Bus policies ─────────────────────────────────────────────────

#[test]
fn silent_bus_skips_missing_handler() {
    let fixture = Fixture::without_definitions();
    fixture.definitions.add_definition(bare_person_definition());

    let bus = SilentBus::new(fixture.repository());
    let command = Command::New(NewCommand::new(person(None, "a", "b")));
    assert!(bus.dispatch(&command).is_ok());
}

#[test]
fn strict_bus_fails_on_missing_handler() {
    let fixture = Fixture::without_definitions();
    fixture.definitions.add_definition(bare_person_definition());

    let bus = StrictBus::new(fixture.repository());
    let command = Command::Remove(RemoveCommand::new(person(Some(1), "a", "b")));
    let err = bus.dispatch(&command).unwrap_err();

    match err {
        UowError::MissingHandler { entity_type, kind } => {
            assert_eq!(entity_type, PERSON);
            assert_eq!(kind, CommandKind::Remove);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bus_routes_to_handler_from_definition() {
    let fixture = Fixture::new();
    let bus = bus_for(DispatchPolicy::Strict, fixture.repository());
    let entity = person(None, "a", "b");

    bus.dispatch(&Command::New(NewCommand::new(entity.clone()))).unwrap();

    assert!(fixture.new_handler.was_persisted(&entity));
    assert_eq!(entity.borrow().id, Some(100));
}

#[test]
fn bus_fails_for_unknown_entity_type() {
    let fixture = Fixture::new();
    let bus = SilentBus::new(fixture.repository());
    let entity = share(DynamicEntity::new("ghost"));

    let err = bus.dispatch(&Command::Remove(RemoveCommand::new(entity))).unwrap_err();
    assert!(matches!(err, UowError::UnknownEntityType(ref t) if t == "ghost"));
}

// ── Through the unit of work ─────────────────────────────────────

#[test]
fn silent_policy_still_untracks_removed_entity() {
    let fixture = Fixture::without_definitions();
    fixture.definitions.add_definition(bare_person_definition());
    let mut uow = fixture.unit_of_work();
    let entity = person(Some(1), "a", "b");

    uow.register(&entity).unwrap();
    uow.remove(&entity).unwrap();
    let report = uow.commit().unwrap();

    assert!(!uow.is_registered(&entity));
    assert_eq!(report.removed, 1);
}

#[test]
fn strict_policy_surfaces_missing_handler_from_commit() {
    let fixture = Fixture::without_definitions();
    fixture.definitions.add_definition(bare_person_definition());
    let mut uow = fixture.unit_of_work_with(
        UnitOfWorkConfig::default().with_dispatch_policy(DispatchPolicy::Strict),
    );
    let entity = person(None, "a", "b");

    uow.register(&entity).unwrap();
    let err = uow.commit().unwrap_err();

    assert!(matches!(err, UowError::MissingHandler { kind: CommandKind::New, .. }));
    assert_eq!(uow.status_of(&entity).unwrap(), EntityStatus::New);
}

#[test]
fn handler_error_propagates_and_commit_is_not_atomic() {
    let fixture = Fixture::new();
    fixture.definitions.add_definition(
        Definition::new("account", "number")
            .observe(["balance"])
            .unwrap()
            .with_edit_handler(Rc::new(FailingEditHandler)),
    );
    let mut uow = fixture.unit_of_work();

    let owner = person(Some(1), "Dawid", "Sajdak");
    let account = share(
        DynamicEntity::new("account")
            .with("number", "PL-001")
            .with("balance", 10),
    );
    uow.register(&owner).unwrap();
    uow.register(&account).unwrap();

    owner.borrow_mut().change_first_name("Norbert");
    account.borrow_mut().set("balance", 20);

    let err = uow.commit().unwrap_err();
    assert!(matches!(err, UowError::Handler(_)));
    assert_eq!(err.to_string(), "storage offline");

    // The owner was dispatched before the failure and keeps its rebased snapshot.
    assert!(fixture.edit_handler.was_persisted(&owner));
    assert_eq!(uow.status_of(&owner).unwrap(), EntityStatus::Persisted);
    // The account still carries its pending change.
    assert_eq!(uow.status_of(&account).unwrap(), EntityStatus::Edited);

    uow.rollback().unwrap();
    assert_eq!(owner.borrow().first_name, "Norbert");
    assert_eq!(account.borrow().get("balance").and_then(Value::as_i64), Some(10));
}

fn failing_team_definition() -> Definition {
    Definition::new("team", "id")
        .observe(["name", "members"])
        .unwrap()
        .with_edit_handler(Rc::new(FailingEditHandler))
}

#[test]
fn rollback_keeps_committed_state_of_tracked_nested_entity() {
    let fixture = Fixture::new();
    fixture.definitions.add_definition(failing_team_definition());
    let mut uow = fixture.unit_of_work();

    let member = person(Some(1), "Dawid", "Sajdak");
    let team = share(
        DynamicEntity::new("team")
            .with("id", 7)
            .with("name", "core")
            .with("members", Value::List(vec![Value::from(member.clone())])),
    );
    uow.register(&member).unwrap();
    uow.register(&team).unwrap();

    member.borrow_mut().change_first_name("Michal");
    let err = uow.commit().unwrap_err();
    assert_eq!(err.to_string(), "storage offline");
    assert!(fixture.edit_handler.was_persisted(&member));

    uow.rollback().unwrap();

    assert_eq!(member.borrow().first_name, "Michal");
    let members = team.borrow().get("members").and_then(Value::as_list).unwrap().to_vec();
    assert_eq!(members.len(), 1);
    assert_eq!(EntityKey::of(members[0].as_entity().unwrap()), EntityKey::of(&member));
    // The team's own baseline still holds the old member state, so it stays edited.
    assert_eq!(uow.status_of(&team).unwrap(), EntityStatus::Edited);
}

#[test]
fn rollback_after_partial_commit_restores_only_uncommitted_entities() {
    let fixture = Fixture::new();
    fixture.definitions.add_definition(failing_team_definition());
    let mut uow = fixture.unit_of_work();

    let committed = person(Some(1), "Dawid", "Sajdak");
    let team = share(
        DynamicEntity::new("team")
            .with("id", 7)
            .with("name", "core")
            .with("members", Value::List(vec![])),
    );
    let pending = person(Some(2), "Norbert", "Orzechowicz");
    uow.register(&committed).unwrap();
    uow.register(&team).unwrap();
    uow.register(&pending).unwrap();

    committed.borrow_mut().change_first_name("Michal");
    team.borrow_mut().set("name", "platform");
    pending.borrow_mut().change_last_name("Nowak");

    assert!(uow.commit().is_err());
    assert!(fixture.edit_handler.was_persisted(&committed));
    assert!(!fixture.edit_handler.was_persisted(&pending));

    uow.rollback().unwrap();

    assert_eq!(committed.borrow().first_name, "Michal");
    assert_eq!(team.borrow().get("name").and_then(Value::as_str), Some("core"));
    assert_eq!(pending.borrow().last_name, "Orzechowicz");
    for entity in [&committed, &pending] {
        assert_eq!(uow.status_of(entity).unwrap(), EntityStatus::Persisted);
    }
    assert_eq!(uow.status_of(&team).unwrap(), EntityStatus::Persisted);
}

#[test]
fn busy_entity_is_reported_instead_of_panicking() {
    let fixture = Fixture::new();
    let mut uow = fixture.unit_of_work();
    let entity = person(Some(1), "a", "b");
    uow.register(&entity).unwrap();

    let _guard = entity.borrow_mut();
    let err = uow.commit().unwrap_err();
    assert!(matches!(err, UowError::EntityBusy(_)));
}
