use tododb::{Credentials, TodoDb, TodoDbBuilder, TodoError, TodoStore, UserStore};

async fn memory_db() -> TodoDb {
    let _ = env_logger::builder().is_test(true).try_init();
    TodoDbBuilder::new("sqlite::memory:")
        .build()
        .await
        .expect("Failed to create TodoDb")
}

async fn register(db: &TodoDb, username: &str) -> i32 {
    UserStore::new(db.clone())
        .register(&Credentials {
            username: username.into(),
            password: "password".into(),
        })
        .await
        .expect("Failed to register user")
        .id
}

#[tokio::test]
async fn test_todo_basic_crud() {
    let db = memory_db().await;
    let alice = register(&db, "alice").await;
    let todos = TodoStore::new(db.clone());

    // CREATE
    let created = todos
        .create(alice, "  buy milk  ")
        .await
        .expect("Failed to create");
    assert_eq!(created.text, "buy milk");
    assert!(!created.done);
    assert_eq!(created.user_id, Some(alice));
    assert!(created.id > 0);

    // LIST
    let all = todos.list(alice).await.expect("Failed to list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, created.id);
    assert_eq!(all[0].text, created.text);

    // TOGGLE
    let toggled = todos.toggle(alice, created.id as i64).await.expect("Failed to toggle");
    assert!(toggled.done);
    assert_eq!(toggled.id, created.id);
    assert_eq!(toggled.text, "buy milk");

    // DELETE
    let deleted = todos.delete(alice, created.id as i64).await.expect("Failed to delete");
    assert_eq!(deleted.message, "Deleted");

    let after_delete = todos.list(alice).await.expect("Failed to list after delete");
    assert!(after_delete.is_empty());
}

#[tokio::test]
async fn test_blank_text_is_rejected() {
    let db = memory_db().await;
    let alice = register(&db, "alice").await;
    let todos = TodoStore::new(db);

    for text in ["", "   ", "\t\n"] {
        let result = todos.create(alice, text).await;
        assert!(
            matches!(result, Err(TodoError::Validation(_))),
            "{text:?} should fail validation"
        );
    }
    assert!(todos.list(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_twice_restores_state() {
    let db = memory_db().await;
    let alice = register(&db, "alice").await;
    let todos = TodoStore::new(db);

    let todo = todos.create(alice, "water plants").await.unwrap();
    let once = todos.toggle(alice, todo.id as i64).await.unwrap();
    let twice = todos.toggle(alice, todo.id as i64).await.unwrap();
    assert!(once.done);
    assert_eq!(twice.done, todo.done);
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let db = memory_db().await;
    let alice = register(&db, "alice").await;
    let todos = TodoStore::new(db);

    assert!(matches!(todos.toggle(alice, 999).await, Err(TodoError::NotFound)));
    assert!(matches!(todos.delete(alice, 999).await, Err(TodoError::NotFound)));
}

#[tokio::test]
async fn test_non_positive_ids_are_invalid() {
    let db = memory_db().await;
    let alice = register(&db, "alice").await;
    let todos = TodoStore::new(db);

    assert!(matches!(todos.toggle(alice, 0).await, Err(TodoError::Validation(_))));
    assert!(matches!(todos.delete(alice, -1).await, Err(TodoError::Validation(_))));
}

#[tokio::test]
async fn test_list_is_ordered_by_id() {
    let db = memory_db().await;
    let alice = register(&db, "alice").await;
    let todos = TodoStore::new(db);

    for text in ["first", "second", "third"] {
        todos.create(alice, text).await.unwrap();
    }
    let listed = todos.list(alice).await.unwrap();
    let texts: Vec<_> = listed.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["first", "second", "third"]);
    assert!(listed.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn test_users_only_see_their_own_todos() {
    let db = memory_db().await;
    let alice = register(&db, "alice").await;
    let bob = register(&db, "bob").await;
    let todos = TodoStore::new(db);

    let private = todos.create(alice, "alice's secret").await.unwrap();
    todos.create(bob, "bob's chore").await.unwrap();

    let bobs = todos.list(bob).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].text, "bob's chore");

    // Bob cannot touch Alice's row; it looks like it does not exist.
    assert!(matches!(
        todos.toggle(bob, private.id as i64).await,
        Err(TodoError::NotFound)
    ));
    assert!(matches!(
        todos.delete(bob, private.id as i64).await,
        Err(TodoError::NotFound)
    ));

    let alices = todos.list(alice).await.unwrap();
    let ids: Vec<_> = alices.iter().map(|t| t.id).collect();
    assert_eq!(ids, [private.id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_do_not_lose_updates() {
    // A file database so that several pooled connections really run at once.
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("todos.db").display());
    let db = TodoDbBuilder::new(&url)
        .max_connections(4)
        .build()
        .await
        .expect("Failed to create TodoDb");
    let alice = register(&db, "alice").await;
    let todos = TodoStore::new(db);
    let todo = todos.create(alice, "flip me").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let todos = todos.clone();
        let id = todo.id as i64;
        handles.push(tokio::spawn(async move { todos.toggle(alice, id).await }));
    }
    for handle in handles {
        handle.await.unwrap().expect("toggle failed");
    }

    // An even number of flips lands back on the starting value.
    let listed = todos.list(alice).await.unwrap();
    assert!(!listed[0].done);
}
