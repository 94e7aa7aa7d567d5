//! Shared fakes for unit-of-work tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use unitwork::{
    ChangeSet, Definition, DefinitionRepository, EditCommandHandler, Entity, EntityKey, EntityRef,
    InMemoryDefinitions, ModelError, ModelResult, NewCommandHandler, RemoveCommandHandler,
    UnitOfWork, UnitOfWorkConfig, Value, share,
};

pub const PERSON: &str = "person";

/// A typed entity with scalar, collection and non-observed properties.
pub struct Person {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub items: Vec<EntityRef>,
    /// Never observed by the test definition.
    pub nickname: String,
}

impl fmt::Debug for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<EntityKey> = self.items.iter().map(EntityKey::of).collect();
        f.debug_struct("Person")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("items", &items)
            .field("nickname", &self.nickname)
            .finish()
    }
}

impl Person {
    pub fn change_first_name(&mut self, name: &str) {
        self.first_name = name.to_string();
    }

    pub fn change_last_name(&mut self, name: &str) {
        self.last_name = name.to_string();
    }
}

fn text(property: &str, value: Value) -> ModelResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(ModelError::TypeMismatch {
            property: property.to_string(),
            expected: "string",
            actual: value.kind_name(),
        })
}

impl Entity for Person {
    fn entity_type(&self) -> &str {
        PERSON
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "first_name" => Some(Value::from(self.first_name.as_str())),
            "last_name" => Some(Value::from(self.last_name.as_str())),
            "items" => Some(Value::List(
                self.items.iter().cloned().map(Value::Entity).collect(),
            )),
            "nickname" => Some(Value::from(self.nickname.as_str())),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> ModelResult<()> {
        match name {
            "id" => self.id = value.as_i64(),
            "first_name" => self.first_name = text(name, value)?,
            "last_name" => self.last_name = text(name, value)?,
            "nickname" => self.nickname = text(name, value)?,
            "items" => {
                let actual = value.kind_name();
                let Value::List(items) = value else {
                    return Err(ModelError::TypeMismatch {
                        property: name.to_string(),
                        expected: "list",
                        actual,
                    });
                };
                self.items = items
                    .into_iter()
                    .filter_map(|item| item.as_entity().cloned())
                    .collect();
            }
            _ => {
                return Err(ModelError::UnknownProperty {
                    entity_type: PERSON.to_string(),
                    property: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

pub fn person(id: Option<i64>, first: &str, last: &str) -> Rc<RefCell<Person>> {
    person_with_items(id, first, last, Vec::new())
}

pub fn person_with_items(
    id: Option<i64>,
    first: &str,
    last: &str,
    items: Vec<Rc<RefCell<Person>>>,
) -> Rc<RefCell<Person>> {
    share(Person {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        items: items.into_iter().map(|item| item as EntityRef).collect(),
        nickname: String::new(),
    })
}

/// Records persisted entities and assigns them increasing ids.
pub struct NewHandlerMock {
    persisted: RefCell<Vec<EntityKey>>,
    next_id: Cell<i64>,
}

impl NewHandlerMock {
    pub fn new() -> Self {
        Self {
            persisted: RefCell::new(Vec::new()),
            next_id: Cell::new(100),
        }
    }

    pub fn was_persisted<E: Entity + ?Sized>(&self, entity: &Rc<RefCell<E>>) -> bool {
        self.persisted.borrow().contains(&EntityKey::of(entity))
    }

    pub fn count(&self) -> usize {
        self.persisted.borrow().len()
    }
}

impl NewCommandHandler for NewHandlerMock {
    fn persist(&self, entity: &EntityRef) -> anyhow::Result<()> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        entity.borrow_mut().set_property("id", Value::from(id))?;
        self.persisted.borrow_mut().push(EntityKey::of(entity));
        Ok(())
    }
}

/// Records edited entities with the change set they were persisted with.
pub struct EditHandlerMock {
    persisted: RefCell<Vec<(EntityKey, ChangeSet)>>,
}

impl EditHandlerMock {
    pub fn new() -> Self {
        Self {
            persisted: RefCell::new(Vec::new()),
        }
    }

    pub fn was_persisted<E: Entity + ?Sized>(&self, entity: &Rc<RefCell<E>>) -> bool {
        self.changes_for(entity).is_some()
    }

    /// The most recent change set persisted for the entity.
    pub fn changes_for<E: Entity + ?Sized>(&self, entity: &Rc<RefCell<E>>) -> Option<ChangeSet> {
        let key = EntityKey::of(entity);
        self.persisted
            .borrow()
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, changes)| changes.clone())
    }

    pub fn count(&self) -> usize {
        self.persisted.borrow().len()
    }
}

impl EditCommandHandler for EditHandlerMock {
    fn persist(&self, entity: &EntityRef, changes: &ChangeSet) -> anyhow::Result<()> {
        self.persisted
            .borrow_mut()
            .push((EntityKey::of(entity), changes.clone()));
        Ok(())
    }
}

pub struct RemoveHandlerMock {
    removed: RefCell<Vec<EntityKey>>,
}

impl RemoveHandlerMock {
    pub fn new() -> Self {
        Self {
            removed: RefCell::new(Vec::new()),
        }
    }

    pub fn was_removed<E: Entity + ?Sized>(&self, entity: &Rc<RefCell<E>>) -> bool {
        self.removed.borrow().contains(&EntityKey::of(entity))
    }

    pub fn count(&self) -> usize {
        self.removed.borrow().len()
    }
}

impl RemoveCommandHandler for RemoveHandlerMock {
    fn remove(&self, entity: &EntityRef) -> anyhow::Result<()> {
        self.removed.borrow_mut().push(EntityKey::of(entity));
        Ok(())
    }
}

/// Edit handler that always fails.
pub struct FailingEditHandler;

impl EditCommandHandler for FailingEditHandler {
    fn persist(&self, _entity: &EntityRef, _changes: &ChangeSet) -> anyhow::Result<()> {
        anyhow::bail!("storage offline")
    }
}

/// Routes engine logs to the test harness. Set `RUST_LOG=unitwork=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Handlers plus the definitions they are wired into.
pub struct Fixture {
    pub definitions: InMemoryDefinitions,
    pub new_handler: Rc<NewHandlerMock>,
    pub edit_handler: Rc<EditHandlerMock>,
    pub remove_handler: Rc<RemoveHandlerMock>,
}

impl Fixture {
    /// Person definition registered up front.
    pub fn new() -> Self {
        let fixture = Self::without_definitions();
        fixture.definitions.add_definition(fixture.person_definition());
        fixture
    }

    /// Empty repository; tests add definitions themselves.
    pub fn without_definitions() -> Self {
        init_tracing();
        Self {
            definitions: InMemoryDefinitions::new(),
            new_handler: Rc::new(NewHandlerMock::new()),
            edit_handler: Rc::new(EditHandlerMock::new()),
            remove_handler: Rc::new(RemoveHandlerMock::new()),
        }
    }

    /// Observes first_name, last_name and items; identity is `id`.
    pub fn person_definition(&self) -> Definition {
        Definition::new(PERSON, "id")
            .observe(["first_name", "last_name", "items"])
            .unwrap()
            .with_new_handler(self.new_handler.clone())
            .with_edit_handler(self.edit_handler.clone())
            .with_remove_handler(self.remove_handler.clone())
    }

    pub fn repository(&self) -> Rc<dyn DefinitionRepository> {
        Rc::new(self.definitions.clone())
    }

    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(self.repository())
    }

    pub fn unit_of_work_with(&self, config: UnitOfWorkConfig) -> UnitOfWork {
        UnitOfWork::with_config(self.repository(), config)
    }
}
