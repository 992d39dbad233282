//! Manipulator behavior against an in-memory session
//!
//! Immediate vs deferred execution, commit / abort, create rollback,
//! retrieve cardinality, and context purity of increment.

mod common;

use common::{setup, user, user_row, User, USER_SCHEMA};
use manipulate_core::{
    Assignation, AssignationType, AttributeUpdate, Comparator, Context, Error, Filter, Manipulator,
    Record, TransactionId, TransactionalManipulator, Value,
};
use manipulate_session::testing::Request;
use manipulate_session::{DriverError, ResultSet};
use std::time::Duration;

// ============================================================================
// Immediate execution
// ============================================================================

#[test]
fn test_create_without_transaction_sends_one_batch() {
    let (session, m) = setup();
    let mut users = vec![user("alice"), user("bob")];

    m.create(&Context::new(), &mut users).unwrap();

    let batches = session.batches();
    assert_eq!(session.request_count(), 1);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    for stmt in batches[0].statements() {
        assert_eq!(stmt.text, "INSERT INTO user (id, name, age, tags) VALUES (?, ?, ?, ?)");
    }

    assert!(!users[0].id.is_empty());
    assert!(!users[1].id.is_empty());
    assert_ne!(users[0].id, users[1].id);
    assert_eq!(batches[0].statements()[0].values[0], Value::Text(users[0].id.clone()));
}

#[test]
fn test_update_and_delete_without_transaction() {
    let (session, m) = setup();
    let mut u = user("alice");
    u.id = "u1".into();

    m.update(&Context::new(), std::slice::from_ref(&u)).unwrap();
    m.delete(&Context::new(), std::slice::from_ref(&u)).unwrap();

    let batches = session.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(
        batches[0].statements()[0].text,
        "UPDATE user SET name = ?, age = ?, tags = ? WHERE id = ?"
    );
    assert_eq!(batches[1].statements()[0].text, "DELETE FROM user WHERE id = ?");
    assert_eq!(batches[1].statements()[0].values, vec![Value::Text("u1".into())]);
}

#[test]
fn test_update_failure_is_execute_error() {
    let (session, m) = setup();
    session.fail_next(DriverError::Invalid("unknown column".into()));

    let err = m.update(&Context::new(), &[user("alice")]).unwrap_err();
    assert!(matches!(err, Error::CannotExecuteQuery(msg) if msg.contains("unknown column")));
}

// ============================================================================
// Deferred accumulation, commit, abort
// ============================================================================

#[test]
fn test_deferred_writes_accumulate_in_call_order() {
    let (session, m) = setup();
    let ctx = Context::new().with_transaction("t1");
    let mut a = vec![user("a")];
    let mut b = user("b");
    b.id = "b-id".into();

    m.create(&ctx, &mut a).unwrap();
    m.update(&ctx, &[b]).unwrap();

    assert_eq!(session.request_count(), 0);
    let batch = m.registry().lookup(&TransactionId::from("t1")).unwrap();
    assert_eq!(batch.len(), 2);
    assert!(batch.statements()[0].text.starts_with("INSERT INTO user"));
    assert!(batch.statements()[1].text.starts_with("UPDATE user"));
    // identifiers are assigned even when deferred
    assert!(!a[0].id.is_empty());
}

#[test]
fn test_commit_executes_then_forgets() {
    let (session, m) = setup();
    let ctx = Context::new().with_transaction("t1");
    let t1 = TransactionId::from("t1");
    let mut b = user("b");
    b.id = "b-id".into();

    m.create(&ctx, &mut [user("a")]).unwrap();
    m.update(&ctx, &[b]).unwrap();
    m.commit(&t1).unwrap();

    let batches = session.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    assert!(batches[0].statements()[0].text.starts_with("INSERT"));
    assert!(batches[0].statements()[1].text.starts_with("UPDATE"));

    assert_eq!(m.commit(&t1).unwrap_err(), Error::TransactionNotFound(t1.clone()));
    assert_eq!(session.batches().len(), 1);

    let metrics = m.metrics();
    assert_eq!(metrics.total_opened, 1);
    assert_eq!(metrics.total_committed, 1);
    assert_eq!(metrics.open_count, 0);
}

#[test]
fn test_commit_unknown_and_empty_token() {
    let (_session, m) = setup();
    assert!(matches!(
        m.commit(&TransactionId::from("nope")),
        Err(Error::TransactionNotFound(_))
    ));
    assert!(matches!(
        m.commit(&TransactionId::none()),
        Err(Error::TransactionNotFound(_))
    ));
}

#[test]
fn test_commit_failure_still_unregisters() {
    let (session, m) = setup();
    let t1 = TransactionId::from("t1");
    m.create(&Context::new().with_transaction("t1"), &mut [user("a")])
        .unwrap();

    session.fail_next(DriverError::Invalid("batch too large".into()));
    let err = m.commit(&t1).unwrap_err();
    assert!(matches!(err, Error::CannotCommit(msg) if msg.contains("batch too large")));

    assert!(!m.registry().contains(&t1));
    assert!(matches!(m.commit(&t1), Err(Error::TransactionNotFound(_))));
    assert_eq!(m.metrics().total_commit_failures, 1);
}

#[test]
fn test_abort_discards_without_executing() {
    let (session, m) = setup();
    let t2 = TransactionId::from("t2");

    m.create(&Context::new().with_transaction("t2"), &mut [user("c")])
        .unwrap();

    assert!(m.abort(&t2));
    assert_eq!(session.request_count(), 0);
    assert!(!m.abort(&t2));
    assert!(matches!(m.commit(&t2), Err(Error::TransactionNotFound(_))));
    assert_eq!(m.metrics().total_aborted, 1);
}

#[test]
fn test_transactions_are_independent() {
    let (session, m) = setup();
    m.create(&Context::new().with_transaction("a"), &mut [user("1")])
        .unwrap();
    m.create(&Context::new().with_transaction("b"), &mut [user("2"), user("3")])
        .unwrap();

    assert!(m.abort(&TransactionId::from("a")));
    m.commit(&TransactionId::from("b")).unwrap();

    let batches = session.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
}

// ============================================================================
// Create rollback
// ============================================================================

#[test]
fn test_create_failure_clears_identifiers() {
    let (session, m) = setup();
    session.fail_next(DriverError::Timeout(Duration::from_millis(600)));
    let mut users = vec![user("d"), user("e")];

    let err = m.create(&Context::new(), &mut users).unwrap_err();

    assert!(matches!(err, Error::CannotExecuteQuery(_)));
    assert!(users.iter().all(|u| u.id.is_empty()));
    assert_eq!(m.metrics().immediate_failures, 1);
}

#[test]
fn test_create_hook_failure_rolls_back_whole_call() {
    let (session, m) = setup();
    let ctx = Context::new().with_create_finalizer(|record| {
        if record.identifier().is_empty() {
            return Err("identifier missing".to_string());
        }
        Ok(())
    });
    let ctx_fail_second = Context::new().with_create_finalizer({
        let calls = std::sync::atomic::AtomicUsize::new(0);
        move |_| {
            if calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 1 {
                Err("second record rejected".to_string())
            } else {
                Ok(())
            }
        }
    });

    // The hook sees the assigned identifier.
    m.create(&ctx, &mut [user("ok")]).unwrap();
    session.clear();

    let mut users = vec![user("a"), user("b"), user("c")];
    let err = m.create(&ctx_fail_second, &mut users).unwrap_err();

    assert!(matches!(err, Error::CannotBuildQuery(msg) if msg.contains("second record rejected")));
    assert!(users.iter().all(|u| u.id.is_empty()));
    assert_eq!(session.request_count(), 0);
}

#[test]
fn test_create_hook_failure_under_transaction_stages_nothing() {
    let (_session, m) = setup();
    let ctx = Context::new()
        .with_transaction("t1")
        .with_create_finalizer(|_| Err("nope".to_string()));

    assert!(m.create(&ctx, &mut [user("a")]).is_err());
    assert!(!m.registry().contains(&TransactionId::from("t1")));
}

#[test]
fn test_create_hook_can_modify_record_identity_view() {
    let (session, m) = setup();
    let ctx = Context::new().with_create_finalizer(|record| {
        assert_eq!(record.identity().name, "user");
        Ok(())
    });
    m.create(&ctx, &mut [user("a")]).unwrap();
    assert_eq!(session.batches().len(), 1);
}

// ============================================================================
// Retrieve
// ============================================================================

#[test]
fn test_retrieve_zero_rows_is_not_found() {
    let (_session, m) = setup();
    let mut u = User {
        id: "missing".into(),
        ..Default::default()
    };
    let err = m.retrieve(&Context::new(), std::slice::from_mut(&mut u)).unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));
}

#[test]
fn test_retrieve_two_rows_is_not_found() {
    let (session, m) = setup();
    session.push_result(ResultSet::new(vec![
        user_row("u1", "a", 1),
        user_row("u1", "b", 2),
    ]));
    let mut u = User {
        id: "u1".into(),
        ..Default::default()
    };
    let err = m.retrieve(&Context::new(), std::slice::from_mut(&mut u)).unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));
}

#[test]
fn test_retrieve_one_row_populates() {
    let (session, m) = setup();
    session.push_result(ResultSet::new(vec![user_row("u1", "alice", 41)]));
    let mut u = User {
        id: "u1".into(),
        ..Default::default()
    };

    m.retrieve(&Context::new(), std::slice::from_mut(&mut u)).unwrap();

    assert_eq!(u.name, "alice");
    assert_eq!(u.age, 41);
    let stmts = session.statements();
    assert_eq!(stmts[0].text, "SELECT * FROM user WHERE id = ?");
    assert_eq!(stmts[0].values, vec![Value::Text("u1".into())]);
}

#[test]
fn test_retrieve_is_never_deferred() {
    let (session, m) = setup();
    session.push_result(ResultSet::new(vec![user_row("u1", "alice", 41)]));
    let mut u = User {
        id: "u1".into(),
        ..Default::default()
    };
    m.retrieve(&Context::new().with_transaction("t1"), std::slice::from_mut(&mut u))
        .unwrap();
    assert!(matches!(session.requests()[0], Request::Query(_)));
    assert!(m.registry().is_empty());
}

#[test]
fn test_retrieve_type_mismatch_is_unmarshal_error() {
    let (session, m) = setup();
    let mut row = user_row("u1", "alice", 1);
    row.insert("age".to_string(), Value::Text("old".into()));
    session.push_result(ResultSet::new(vec![row]));
    let mut u = User {
        id: "u1".into(),
        ..Default::default()
    };
    let err = m.retrieve(&Context::new(), std::slice::from_mut(&mut u)).unwrap_err();
    assert!(matches!(err, Error::CannotUnmarshal(_)));
}

#[test]
fn test_retrieve_many_empty_and_filled() {
    let (session, m) = setup();
    let none: Vec<User> = m.retrieve_many(&Context::new()).unwrap();
    assert!(none.is_empty());

    session.push_result(ResultSet::new(vec![
        user_row("u1", "a", 1),
        user_row("u2", "b", 2),
    ]));
    let ctx = Context::new()
        .with_filter(Filter::new().and("age", Comparator::GreaterThan, 0i64))
        .with_page_size(10);
    let users: Vec<User> = m.retrieve_many(&ctx).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].id, "u2");

    let stmts = session.statements();
    assert_eq!(stmts[0].text, "SELECT * FROM user");
    assert_eq!(
        stmts[1].text,
        "SELECT * FROM user WHERE age > ? LIMIT ? ALLOW FILTERING"
    );
}

#[test]
fn test_retrieve_many_execute_error() {
    let (session, m) = setup();
    session.fail_next(DriverError::Cursor("closed".into()));
    let err = m.retrieve_many::<User>(&Context::new()).unwrap_err();
    assert!(matches!(err, Error::CannotExecuteQuery(_)));
}

// ============================================================================
// Count
// ============================================================================

#[test]
fn test_count() {
    let (session, m) = setup();
    session.push_result(ResultSet::count(7));
    assert_eq!(m.count(&Context::new(), &USER_SCHEMA.identity).unwrap(), 7);
    assert_eq!(session.statements()[0].text, "SELECT COUNT(*) FROM user");
}

#[test]
fn test_count_unscannable_is_execute_error() {
    let (_session, m) = setup();
    // no queued result: zero rows
    let err = m.count(&Context::new(), &User::schema().identity).unwrap_err();
    assert!(matches!(err, Error::CannotExecuteQuery(msg) if msg.contains("scan")));
}

#[test]
fn test_count_cursor_error_is_execute_error() {
    let (session, m) = setup();
    session.fail_next(DriverError::Cursor("connection reset".into()));
    let err = m.count(&Context::new(), &USER_SCHEMA.identity).unwrap_err();
    assert!(matches!(err, Error::CannotExecuteQuery(_)));
}

// ============================================================================
// Increment
// ============================================================================

#[test]
fn test_increment_leaves_context_untouched() {
    let (session, m) = setup();
    let filter = Filter::new().equal("id", "counter-1");
    let ctx = Context::new().with_filter(filter.clone());

    m.increment(&ctx, &USER_SCHEMA.identity, "age", 3).unwrap();

    assert_eq!(ctx.filter, Some(filter));

    let batch = &session.batches()[0];
    assert_eq!(
        batch.statements()[0].text,
        "UPDATE user SET age = age + ? WHERE id = ?"
    );
    assert_eq!(
        batch.statements()[0].values,
        vec![Value::Int(3), Value::Text("counter-1".into())]
    );
}

#[test]
fn test_increment_failure_leaves_context_untouched() {
    let (session, m) = setup();
    session.fail_next(DriverError::Invalid("not a counter".into()));
    let filter = Filter::new().equal("id", "counter-1");
    let ctx = Context::new().with_filter(filter.clone());

    assert!(m.increment(&ctx, &USER_SCHEMA.identity, "age", -1).is_err());
    assert_eq!(ctx.filter, Some(filter));
}

#[test]
fn test_increment_deferred() {
    let (session, m) = setup();
    let ctx = Context::new()
        .with_transaction("t1")
        .with_filter(Filter::new().equal("id", "c"));
    m.increment(&ctx, &USER_SCHEMA.identity, "age", 1).unwrap();
    m.increment(&ctx, &USER_SCHEMA.identity, "age", 1).unwrap();

    assert_eq!(session.request_count(), 0);
    assert_eq!(m.registry().lookup(&TransactionId::from("t1")).unwrap().len(), 2);
}

#[test]
fn test_increment_without_filter_cannot_build() {
    let (session, m) = setup();
    let err = m
        .increment(&Context::new(), &USER_SCHEMA.identity, "age", 1)
        .unwrap_err();
    assert!(matches!(err, Error::CannotBuildQuery(_)));
    assert_eq!(session.request_count(), 0);
}

#[test]
fn test_increment_rejects_not_equal_key() {
    let (session, m) = setup();
    let ctx = Context::new().with_filter(Filter::new().and("id", Comparator::NotEqual, "keep-me"));

    let err = m.increment(&ctx, &USER_SCHEMA.identity, "age", 1).unwrap_err();

    assert!(matches!(err, Error::CannotBuildQuery(msg) if msg.contains("'id'")));
    assert_eq!(session.request_count(), 0);
}

#[test]
fn test_increment_rejects_range_key() {
    let (session, m) = setup();
    let ctx = Context::new().with_filter(Filter::new().and("id", Comparator::GreaterThan, "a"));

    let err = m.increment(&ctx, &USER_SCHEMA.identity, "age", 1).unwrap_err();

    assert!(matches!(err, Error::CannotBuildQuery(msg) if msg.contains("GreaterThan")));
    assert_eq!(session.request_count(), 0);
}

#[test]
fn test_increment_rejected_key_stages_nothing() {
    let (session, m) = setup();
    let ctx = Context::new()
        .with_transaction("t1")
        .with_filter(Filter::new().equal("id", "c").and("tags", Comparator::Contains, "x"));

    assert!(m.increment(&ctx, &USER_SCHEMA.identity, "age", 1).is_err());
    assert!(!m.registry().contains(&TransactionId::from("t1")));
    assert_eq!(session.request_count(), 0);
}

// ============================================================================
// Update collection
// ============================================================================

#[test]
fn test_update_collection_executes_single_statement() {
    let (session, m) = setup();
    let mut u = user("a");
    u.id = "u1".into();
    let update = AttributeUpdate::new(
        "tags",
        Value::Set(vec![Value::from("admin")]),
        AssignationType::Add,
    );

    m.update_collection(&Context::new(), &update, &u).unwrap();

    match &session.requests()[0] {
        Request::Execute(stmt) => {
            assert_eq!(stmt.text, "UPDATE user SET tags = tags + ? WHERE id = ?");
            assert_eq!(stmt.values[1], Value::Text("u1".into()));
        }
        other => panic!("unexpected request {other:?}"),
    }
}

#[test]
fn test_update_collection_failure() {
    let (session, m) = setup();
    session.fail_next(DriverError::Invalid("tags is not a set".into()));
    let update = AttributeUpdate::new("tags", Value::Set(vec![]), AssignationType::Set);
    let err = m
        .update_collection(&Context::new(), &update, &user("a"))
        .unwrap_err();
    assert!(matches!(err, Error::CannotExecuteQuery(_)));
}

// ============================================================================
// Unsupported operations
// ============================================================================

#[test]
fn test_delete_many_and_assign_are_not_implemented() {
    let (session, m) = setup();

    let err = m.delete_many(&Context::new(), &USER_SCHEMA.identity).unwrap_err();
    assert!(matches!(err, Error::NotImplemented(msg) if msg.contains("DeleteMany")));

    let assignation = Assignation {
        members_added: vec!["a".into()],
        members_removed: vec![],
        members: vec![],
    };
    let err = m.assign(&Context::new(), &assignation).unwrap_err();
    assert!(matches!(err, Error::NotImplemented(msg) if msg.contains("Assign")));

    assert_eq!(session.request_count(), 0);
}
