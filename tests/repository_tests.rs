#![cfg(feature = "sqlite")]

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sql_repo_toolkit::{Entity, SqlExecutor, SqlRepository, SqlStatement, SqliteExecutor};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
   id: i64,
   title: String,
   done: bool,
}

impl Entity for Task {
   type Id = i64;

   fn table_name() -> &'static str {
      "tasks"
   }

   fn columns() -> &'static [&'static str] {
      &["id", "title", "done"]
   }

   fn id(&self) -> &i64 {
      &self.id
   }
}

async fn create_test_repo() -> (SqlRepository<Task>, Arc<SqliteExecutor>, TempDir) {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let db_path = temp_dir.path().join("test.db");
   let executor = Arc::new(
      SqliteExecutor::connect(&db_path)
         .await
         .expect("Failed to connect to test database"),
   );

   executor
      .execute(&SqlStatement::bare(
         "CREATE TABLE tasks (id INTEGER PRIMARY KEY, title TEXT NOT NULL, done BOOLEAN NOT NULL)",
      ))
      .await
      .unwrap();

   (SqlRepository::new(executor.clone()), executor, temp_dir)
}

fn task(id: i64, title: &str, done: bool) -> Task {
   Task {
      id,
      title: title.into(),
      done,
   }
}

// ─── CRUD pass-throughs ───

#[tokio::test]
async fn insert_then_find_by_id_round_trips() {
   let (repo, _executor, _temp) = create_test_repo().await;

   let original = task(1, "write tests", false);
   assert_eq!(repo.insert(&original).await.unwrap(), 1);

   let found = repo.find_by_id(&1).await.unwrap();
   assert_eq!(found, Some(original));
}

#[tokio::test]
async fn find_by_id_misses_return_none() {
   let (repo, _executor, _temp) = create_test_repo().await;

   assert_eq!(repo.find_by_id(&99).await.unwrap(), None);
}

#[tokio::test]
async fn update_changes_only_the_matching_row() {
   let (repo, _executor, _temp) = create_test_repo().await;

   repo.insert(&task(1, "first", false)).await.unwrap();
   repo.insert(&task(2, "second", false)).await.unwrap();

   let affected = repo.update(&task(1, "first, revised", true)).await.unwrap();
   assert_eq!(affected, 1);

   assert_eq!(repo.find_by_id(&1).await.unwrap().unwrap().title, "first, revised");
   assert_eq!(repo.find_by_id(&2).await.unwrap().unwrap().done, false);
}

#[tokio::test]
async fn delete_by_id_and_count() {
   let (repo, _executor, _temp) = create_test_repo().await;

   repo.insert(&task(1, "a", false)).await.unwrap();
   repo.insert(&task(2, "b", true)).await.unwrap();
   assert_eq!(repo.count().await.unwrap(), 2);

   assert_eq!(repo.delete_by_id(&1).await.unwrap(), 1);
   assert_eq!(repo.count().await.unwrap(), 1);

   // Deleting an absent row affects nothing.
   assert_eq!(repo.delete_by_id(&1).await.unwrap(), 0);
}

#[tokio::test]
async fn find_all_returns_every_row() {
   let (repo, _executor, _temp) = create_test_repo().await;

   for id in 1..=4 {
      repo.insert(&task(id, "t", id % 2 == 0)).await.unwrap();
   }

   let all = repo.find_all().await.unwrap();
   assert_eq!(all.len(), 4);
   assert!(all.iter().any(|t| t.id == 3 && !t.done));
}

// ─── Deferred writes ───

#[tokio::test]
async fn deferred_writes_apply_together_on_flush() {
   let (repo, _executor, _temp) = create_test_repo().await;

   repo.defer_insert(&task(1, "a", false)).unwrap();
   repo.defer_insert(&task(2, "b", false)).unwrap();
   repo.defer_update(&task(1, "a, done", true)).unwrap();
   assert_eq!(repo.deferred_len(), 3);

   // Nothing visible before the flush.
   assert_eq!(repo.count().await.unwrap(), 0);

   let affected = repo.flush_deferred().await.unwrap();
   assert_eq!(affected, vec![1, 1, 1]);
   assert_eq!(repo.deferred_len(), 0);

   assert_eq!(repo.count().await.unwrap(), 2);
   assert_eq!(repo.find_by_id(&1).await.unwrap().unwrap().title, "a, done");
}

#[tokio::test]
async fn failed_flush_rolls_back_every_deferred_write() {
   let (repo, _executor, _temp) = create_test_repo().await;

   repo.insert(&task(1, "existing", false)).await.unwrap();

   repo.defer_insert(&task(2, "fine", false)).unwrap();
   // Reuses id 1, violating the primary key and failing the transaction.
   repo.defer_insert(&task(1, "conflict", false)).unwrap();

   assert!(repo.flush_deferred().await.is_err());

   // The first deferred insert rolled back with the second.
   assert_eq!(repo.count().await.unwrap(), 1);
   assert_eq!(repo.find_by_id(&2).await.unwrap(), None);
}
