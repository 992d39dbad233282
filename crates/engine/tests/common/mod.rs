//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use manipulate_core::{Field, Identity, Manipulable, Record, Row, Schema, Value};
use manipulate_engine::CqlManipulator;
use manipulate_session::testing::MemorySession;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub tags: Vec<String>,
}

pub static USER_SCHEMA: Schema<User> = Schema::new(
    Identity::new("user", "users"),
    &[
        Field::primary_key("id", |u| Ok(u.id.clone().into()), |u, v| {
            u.id = v.decode()?;
            Ok(())
        }),
        Field::new("name", |u| Ok(u.name.clone().into()), |u, v| {
            u.name = v.decode()?;
            Ok(())
        }),
        Field::new("age", |u| Ok(u.age.into()), |u, v| {
            u.age = v.decode()?;
            Ok(())
        }),
        Field::new("tags", |u| Ok(Value::Set(u.tags.iter().map(|t| Value::from(t.as_str())).collect())), |u, v| {
            u.tags = v.decode()?;
            Ok(())
        }),
    ],
);

impl Manipulable for User {
    fn identity(&self) -> Identity {
        USER_SCHEMA.identity
    }

    fn identifier(&self) -> &str {
        &self.id
    }

    fn set_identifier(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for User {
    fn schema() -> &'static Schema<Self> {
        &USER_SCHEMA
    }
}

pub fn user(name: &str) -> User {
    User {
        name: name.to_string(),
        age: 30,
        ..Default::default()
    }
}

pub fn user_row(id: &str, name: &str, age: i64) -> Row {
    let mut row = Row::new();
    row.insert("id".to_string(), Value::Text(id.to_string()));
    row.insert("name".to_string(), Value::Text(name.to_string()));
    row.insert("age".to_string(), Value::Int(age));
    row
}

pub fn setup() -> (Arc<MemorySession>, CqlManipulator) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let session = Arc::new(MemorySession::new());
    let manipulator = CqlManipulator::with_session(session.clone(), "test");
    (session, manipulator)
}
