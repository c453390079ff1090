use bender_core::query::Statement;
use bender_core::{
    open_store, open_store_in_memory, ErrorCode, Executor, NewPost, Payload, PostChanges,
    PostService, Row, SqliteExecutor, StoreConfig, StoreError, StoreResult,
};
use rusqlite::types::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn service() -> PostService<SqliteExecutor> {
    let conn = open_store_in_memory().unwrap();
    PostService::new(SqliteExecutor::new(conn), "main", "blog_table")
}

fn new_post(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        subtitle: "S".to_string(),
        author_id: 7,
        tags: Vec::new(),
        body: "B".to_string(),
    }
}

fn create(service: &PostService<SqliteExecutor>, title: &str) -> String {
    let result = service.create(new_post(title));
    assert_eq!(result.errno, ErrorCode::Ok);
    result.created_id().unwrap().to_string()
}

fn row_count(service: &PostService<SqliteExecutor>) -> i64 {
    service
        .executor()
        .with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM blog_table;", [], |row| row.get(0))
        })
        .unwrap()
}

#[test]
fn create_then_get_echoes_input_with_equal_timestamps() {
    let service = service();
    let id = create(&service, "A");

    let result = service.get_by_id(&id, &[]);
    assert_eq!(result.errno, ErrorCode::Ok);
    assert_eq!(result.rows().len(), 1);

    let post = result.rows()[0].clone().into_post().unwrap();
    assert_eq!(post.id, id);
    assert_eq!(post.title, "A");
    assert_eq!(post.subtitle, "S");
    assert_eq!(post.author_id, 7);
    assert_eq!(post.body, "B");
    assert!(post.tags.is_empty());
    assert_eq!(post.created_time, post.updated_time);
    assert!(post.created_time > 0);
}

#[test]
fn create_with_existing_title_is_duptitle_and_adds_nothing() {
    let service = service();
    create(&service, "A");
    assert_eq!(row_count(&service), 1);

    let result = service.create(new_post("A"));
    assert_eq!(result.errno, ErrorCode::DupTitle);
    assert!(matches!(result.payload, Payload::Empty));
    assert_eq!(row_count(&service), 1);
}

#[test]
fn list_all_on_empty_store_is_ok_and_empty() {
    let service = service();
    let result = service.list_all(&[], 10, 0);
    assert_eq!(result.errno, ErrorCode::Ok);
    assert!(matches!(&result.payload, Payload::Rows(rows) if rows.is_empty()));
}

#[test]
fn list_all_applies_pagination_and_projection() {
    let service = service();
    for title in ["A", "B", "C"] {
        create(&service, title);
    }

    let fields = vec!["title".to_string()];
    let first_page = service.list_all(&fields, 2, 0);
    let second_page = service.list_all(&fields, 2, 2);
    assert_eq!(first_page.rows().len(), 2);
    assert_eq!(second_page.rows().len(), 1);

    let mut titles = first_page
        .rows()
        .iter()
        .chain(second_page.rows())
        .map(|row| {
            assert!(row.id.is_none());
            row.title.clone().unwrap()
        })
        .collect::<Vec<_>>();
    titles.sort();
    assert_eq!(titles, vec!["A", "B", "C"]);
}

#[test]
fn get_unknown_id_is_ok_with_no_rows() {
    let service = service();
    let result = service.get_by_id("missing-id", &[]);
    assert_eq!(result.errno, ErrorCode::Ok);
    assert!(result.rows().is_empty());
}

#[test]
fn get_with_unknown_field_is_dberr() {
    let service = service();
    let id = create(&service, "A");
    let result = service.get_by_id(&id, &["no_such_column".to_string()]);
    assert_eq!(result.errno, ErrorCode::DbErr);
    assert!(matches!(result.payload, Payload::Failed(StoreError::Sqlite(_))));
}

#[test]
fn update_missing_id_is_noexist_and_changes_nothing() {
    let service = service();
    create(&service, "A");

    let result = service.update(
        "missing-id",
        PostChanges {
            title: Some("Z".to_string()),
            ..PostChanges::default()
        },
    );
    assert_eq!(result.errno, ErrorCode::NoExist);
    assert_eq!(row_count(&service), 1);
    let listed = service.list_all(&["title".to_string()], 10, 0);
    assert_eq!(listed.rows()[0].title.as_deref(), Some("A"));
}

#[test]
fn update_to_title_of_other_post_is_duptitle_and_leaves_target_unmodified() {
    let service = service();
    create(&service, "A");
    let target = create(&service, "B");
    let before = service.get_by_id(&target, &[]).rows()[0].clone();

    let result = service.update(
        &target,
        PostChanges {
            title: Some("A".to_string()),
            body: Some("changed".to_string()),
            ..PostChanges::default()
        },
    );
    assert_eq!(result.errno, ErrorCode::DupTitle);

    let after = service.get_by_id(&target, &[]).rows()[0].clone();
    assert_eq!(before, after);
}

#[test]
fn update_keeping_own_title_is_allowed() {
    let service = service();
    let id = create(&service, "A");

    let result = service.update(
        &id,
        PostChanges {
            title: Some("A".to_string()),
            subtitle: Some("new".to_string()),
            ..PostChanges::default()
        },
    );
    assert_eq!(result.errno, ErrorCode::Ok);
    assert!(matches!(result.payload, Payload::Ack));
}

#[test]
fn partial_update_changes_only_requested_fields_and_updated_time() {
    let service = service();
    let id = create(&service, "A");
    let before = service.get_by_id(&id, &[]).rows()[0]
        .clone()
        .into_post()
        .unwrap();

    let result = service.update(
        &id,
        PostChanges {
            subtitle: Some("X".to_string()),
            ..PostChanges::default()
        },
    );
    assert_eq!(result.errno, ErrorCode::Ok);

    let after = service.get_by_id(&id, &[]).rows()[0]
        .clone()
        .into_post()
        .unwrap();
    assert_eq!(after.subtitle, "X");
    assert_eq!(after.title, before.title);
    assert_eq!(after.author_id, before.author_id);
    assert_eq!(after.body, before.body);
    assert_eq!(after.tags, before.tags);
    assert_eq!(after.created_time, before.created_time);
    assert!(after.updated_time > before.updated_time);
}

#[test]
fn updated_time_increases_across_back_to_back_updates() {
    let service = service();
    let id = create(&service, "A");

    let mut last = 0;
    for round in 0..5 {
        let result = service.update(
            &id,
            PostChanges {
                body: Some(format!("body {round}")),
                ..PostChanges::default()
            },
        );
        assert_eq!(result.errno, ErrorCode::Ok);
        let current = service.get_by_id(&id, &["updated_time".to_string()]).rows()[0]
            .updated_time
            .unwrap();
        assert!(current > last);
        last = current;
    }
}

#[test]
fn empty_fields_in_update_are_ignored_but_timestamp_is_touched() {
    let service = service();
    let id = create(&service, "A");
    let before = service.get_by_id(&id, &[]).rows()[0]
        .clone()
        .into_post()
        .unwrap();

    let result = service.update(
        &id,
        PostChanges {
            title: Some(String::new()),
            tags: Some(Vec::new()),
            ..PostChanges::default()
        },
    );
    assert_eq!(result.errno, ErrorCode::Ok);

    let after = service.get_by_id(&id, &[]).rows()[0]
        .clone()
        .into_post()
        .unwrap();
    assert_eq!(after.title, "A");
    assert!(after.updated_time > before.updated_time);
}

#[test]
fn update_replaces_tags() {
    let service = service();
    let id = create(&service, "A");

    let result = service.update(
        &id,
        PostChanges {
            tags: Some(vec!["rust".to_string(), "sql".to_string()]),
            ..PostChanges::default()
        },
    );
    assert_eq!(result.errno, ErrorCode::Ok);
    let tags = service.get_by_id(&id, &["tags".to_string()]).rows()[0]
        .tags
        .clone()
        .unwrap();
    assert_eq!(tags, vec!["rust", "sql"]);
}

#[test]
fn delete_twice_is_ok_then_noexist() {
    let service = service();
    let id = create(&service, "A");

    let first = service.delete(&id);
    assert_eq!(first.errno, ErrorCode::Ok);
    let second = service.delete(&id);
    assert_eq!(second.errno, ErrorCode::NoExist);
    assert!(second.rows().is_empty());
    assert_eq!(row_count(&service), 0);
}

#[test]
fn delete_missing_id_is_noexist() {
    let service = service();
    let result = service.delete("missing-id");
    assert_eq!(result.errno, ErrorCode::NoExist);
    assert!(matches!(result.payload, Payload::Empty));
}

#[test]
fn deleted_title_can_be_reused() {
    let service = service();
    let id = create(&service, "A");
    assert_eq!(service.delete(&id).errno, ErrorCode::Ok);
    create(&service, "A");
}

#[test]
fn concurrent_creates_with_same_title_leave_one_row() {
    let service = Arc::new(service());
    let handles = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.create(new_post("race")).errno)
        })
        .collect::<Vec<_>>();

    let codes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(codes.iter().filter(|code| **code == ErrorCode::Ok).count(), 1);
    assert!(codes
        .iter()
        .all(|code| matches!(code, ErrorCode::Ok | ErrorCode::DupTitle)));
    assert_eq!(row_count(&service), 1);
}

/// Fails every statement after `healthy_calls` successful ones.
struct FlakyExecutor {
    inner: SqliteExecutor,
    healthy_calls: usize,
    calls: AtomicUsize,
}

impl FlakyExecutor {
    fn new(healthy_calls: usize) -> Self {
        Self {
            inner: SqliteExecutor::new(open_store_in_memory().unwrap()),
            healthy_calls,
            calls: AtomicUsize::new(0),
        }
    }

    fn check(&self) -> StoreResult<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.healthy_calls {
            return Err(StoreError::ConnectionPoisoned);
        }
        Ok(())
    }
}

impl Executor for FlakyExecutor {
    fn query(&self, statement: &Statement) -> StoreResult<Vec<Row>> {
        self.check()?;
        self.inner.query(statement)
    }

    fn execute(&self, statement: &Statement) -> StoreResult<usize> {
        self.check()?;
        self.inner.execute(statement)
    }
}

#[test]
fn store_failure_on_read_is_dberr_with_error_payload() {
    let service = PostService::new(FlakyExecutor::new(0), "main", "blog_table");
    let result = service.list_all(&[], 10, 0);
    assert_eq!(result.errno, ErrorCode::DbErr);
    assert!(matches!(
        result.payload,
        Payload::Failed(StoreError::ConnectionPoisoned)
    ));
}

#[test]
fn failed_title_probe_blocks_create() {
    let service = PostService::new(FlakyExecutor::new(0), "main", "blog_table");
    let result = service.create(new_post("A"));
    assert_eq!(result.errno, ErrorCode::DbErr);

    let calls = service.executor().calls.load(Ordering::SeqCst);
    assert_eq!(calls, 1, "insert must not run after a failed probe");
}

#[test]
fn failed_existence_probe_is_not_reported_as_noexist() {
    let service = PostService::new(FlakyExecutor::new(0), "main", "blog_table");
    assert_eq!(service.delete("any").errno, ErrorCode::DbErr);
    assert_eq!(
        service.update("any", PostChanges::default()).errno,
        ErrorCode::DbErr
    );
}

#[test]
fn failure_after_passing_probe_is_dberr() {
    // probe succeeds, insert fails
    let service = PostService::new(FlakyExecutor::new(1), "main", "blog_table");
    let result = service.create(new_post("A"));
    assert_eq!(result.errno, ErrorCode::DbErr);
}

/// Answers every read with a fixed row set, so probes see a stale view of
/// the store while writes still hit the real table.
struct StaleReadExecutor {
    inner: SqliteExecutor,
    rows: Vec<Row>,
}

impl Executor for StaleReadExecutor {
    fn query(&self, _statement: &Statement) -> StoreResult<Vec<Row>> {
        Ok(self.rows.clone())
    }

    fn execute(&self, statement: &Statement) -> StoreResult<usize> {
        self.inner.execute(statement)
    }
}

#[test]
fn unique_violation_after_passing_probe_maps_to_duptitle() {
    let stale = PostService::new(
        StaleReadExecutor {
            inner: SqliteExecutor::new(open_store_in_memory().unwrap()),
            rows: Vec::new(),
        },
        "main",
        "blog_table",
    );
    assert_eq!(stale.create(new_post("A")).errno, ErrorCode::Ok);
    // the probe still reports "absent"; only the UNIQUE index catches this one
    assert_eq!(stale.create(new_post("A")).errno, ErrorCode::DupTitle);

    let count: i64 = stale
        .executor()
        .inner
        .with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM blog_table;", [], |row| row.get(0))
        })
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn unique_violation_on_update_after_passing_probe_maps_to_duptitle() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        database_path: Some(dir.path().join("bender.db")),
        ..StoreConfig::default()
    };
    let fresh = PostService::from_config(SqliteExecutor::new(open_store(&config).unwrap()), &config);
    create(&fresh, "A");
    let id_b = create(&fresh, "B");

    // every read only ever sees B itself, so the title check passes
    let mut own_row = Row::new();
    own_row.insert("id".to_string(), Value::Text(id_b.clone()));
    own_row.insert("title".to_string(), Value::Text("B".to_string()));
    own_row.insert("updated_time".to_string(), Value::Integer(1));
    let stale = PostService::from_config(
        StaleReadExecutor {
            inner: SqliteExecutor::new(open_store(&config).unwrap()),
            rows: vec![own_row],
        },
        &config,
    );

    let result = stale.update(
        &id_b,
        PostChanges {
            title: Some("A".to_string()),
            ..PostChanges::default()
        },
    );
    assert_eq!(result.errno, ErrorCode::DupTitle);

    let post_b = fresh.get_by_id(&id_b, &[]);
    assert_eq!(post_b.rows()[0].title.as_deref(), Some("B"));
    assert_eq!(post_b.rows()[0].created_time, post_b.rows()[0].updated_time);
}

#[test]
fn row_vanishing_after_passing_probe_maps_to_noexist() {
    let mut ghost = Row::new();
    ghost.insert("id".to_string(), Value::Text("ghost".to_string()));
    ghost.insert("updated_time".to_string(), Value::Integer(1));

    let service = PostService::new(
        StaleReadExecutor {
            inner: SqliteExecutor::new(open_store_in_memory().unwrap()),
            rows: vec![ghost],
        },
        "main",
        "blog_table",
    );
    assert_eq!(service.delete("ghost").errno, ErrorCode::NoExist);
    let result = service.update(
        "ghost",
        PostChanges {
            body: Some("x".to_string()),
            ..PostChanges::default()
        },
    );
    assert_eq!(result.errno, ErrorCode::NoExist);
}
