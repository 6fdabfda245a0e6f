//! Turso/libSQL implementation of evaluation storage.
//!
//! This module provides persistent storage using Turso (libSQL), backed by
//! a local embedded SQLite file or by `:memory:` for tests.
//!
//! All access goes through one connection. Writes that touch more than one
//! table run in a transaction under a write lock, so a failed write leaves
//! no id registered without its rows.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Builder, Connection, Database};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{AsyncEvaluationRepository, Error, EvaluationRepository, Result};
use crate::domain::{EvaluationOverview, ExampleEvaluation, ExampleResult, PartialEvaluationOverview};

/// Every id results may be stored under.
const SCHEMA_EVALUATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS evaluations (
    id TEXT PRIMARY KEY
)
"#;

/// SQL schema for finished-run overviews.
const SCHEMA_OVERVIEWS: &str = r#"
CREATE TABLE IF NOT EXISTS evaluation_overviews (
    id TEXT PRIMARY KEY,
    overview TEXT NOT NULL
)
"#;

/// SQL schema for in-progress overviews.
const SCHEMA_PARTIAL_OVERVIEWS: &str = r#"
CREATE TABLE IF NOT EXISTS partial_evaluation_overviews (
    id TEXT PRIMARY KEY,
    overview TEXT NOT NULL
)
"#;

/// SQL schema for per-example results; `seq` preserves arrival order.
const SCHEMA_EXAMPLE_EVALUATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS example_evaluations (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    evaluation_id TEXT NOT NULL,
    example_id TEXT NOT NULL,
    result TEXT NOT NULL
)
"#;

/// SQL index for result listings.
const INDEX_EXAMPLE_EVALUATIONS: &str = r#"
CREATE INDEX IF NOT EXISTS idx_example_evaluations_lookup
ON example_evaluations(evaluation_id, example_id, seq)
"#;

/// Turso-backed evaluation repository.
#[derive(Clone)]
pub struct TursoEvaluationRepository {
    // Kept alive for the connection below.
    _db: Arc<Database>,
    conn: Connection,
    // Transactions share `conn`; only one may be open at a time.
    write_lock: Arc<Mutex<()>>,
}

impl TursoEvaluationRepository {
    /// Open (or create) a local embedded database file.
    pub async fn new_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        Self::open(db).await
    }

    /// Create an in-memory database (for testing).
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::open(db).await
    }

    async fn open(db: Database) -> Result<Self> {
        let conn = db.connect()?;
        let repo = Self {
            _db: Arc::new(db),
            conn,
            write_lock: Arc::new(Mutex::new(())),
        };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// Ensure the database schema exists.
    async fn ensure_schema(&self) -> Result<()> {
        self.conn.execute(SCHEMA_EVALUATIONS, ()).await?;
        self.conn.execute(SCHEMA_OVERVIEWS, ()).await?;
        self.conn.execute(SCHEMA_PARTIAL_OVERVIEWS, ()).await?;
        self.conn.execute(SCHEMA_EXAMPLE_EVALUATIONS, ()).await?;
        self.conn.execute(INDEX_EXAMPLE_EVALUATIONS, ()).await?;
        Ok(())
    }

    async fn register_evaluation(conn: &Connection, evaluation_id: &str) -> Result<()> {
        conn.execute(
                "INSERT OR IGNORE INTO evaluations (id) VALUES (?)",
            [evaluation_id.to_string()],
        )
        .await?;
        Ok(())
    }

    async fn is_registered(&self, evaluation_id: &str) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM evaluations WHERE id = ?",
                [evaluation_id.to_string()],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Read one JSON document column by id from `table`.
    async fn load_json<T: DeserializeOwned>(&self, table: &str, id: &str) -> Result<Option<T>> {
        let sql = format!("SELECT overview FROM {table} WHERE id = ?");
        let mut rows = self.conn.query(&sql, [id.to_string()]).await?;
        match rows.next().await? {
            Some(row) => {
                let json: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    async fn ids(&self, table: &str) -> Result<Vec<String>> {
        let sql = format!("SELECT id FROM {table} ORDER BY id ASC");
        let mut rows = self.conn.query(&sql, ()).await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    /// Register `id` and upsert its overview document in one transaction.
    async fn store_overview_json(&self, table: &str, id: &str, json: String) -> Result<()> {
        let sql = format!(
            "INSERT INTO {table} (id, overview) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET overview = excluded.overview"
        );

        let _guard = self.write_lock.lock().await;
        let tx = self.conn.transaction().await?;
        let written = async {
            Self::register_evaluation(&tx, id).await?;
            tx.execute(&sql, libsql::params![id.to_string(), json])
                .await?;
            Ok::<_, Error>(())
        }
        .await;
        Self::finish(tx, written).await
    }

    /// Commit when every statement succeeded, otherwise roll back and
    /// return the first error.
    async fn finish(tx: libsql::Transaction, written: Result<()>) -> Result<()> {
        match written {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Parse an example evaluation from a database row.
    fn parse_example_evaluation<E: DeserializeOwned>(
        row: &libsql::Row,
    ) -> Result<ExampleEvaluation<E>> {
        let evaluation_id: String = row.get(0)?;
        let example_id: String = row.get(1)?;
        let result_json: String = row.get(2)?;

        let result: ExampleResult<E> = serde_json::from_str(&result_json).inspect_err(|e| {
            debug!(%evaluation_id, %example_id, error = %e, "stored result does not decode");
        })?;

        Ok(ExampleEvaluation {
            evaluation_id,
            example_id,
            result,
        })
    }
}

#[async_trait]
impl EvaluationRepository for TursoEvaluationRepository {
    #[instrument(skip(self, overview), fields(id = %overview.id), level = "debug")]
    async fn store_evaluation_overview(&self, overview: EvaluationOverview) -> Result<()> {
        let json = serde_json::to_string(&overview)?;
        self.store_overview_json("evaluation_overviews", &overview.id, json)
            .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn evaluation_overview(&self, evaluation_id: &str) -> Result<Option<EvaluationOverview>> {
        self.load_json("evaluation_overviews", evaluation_id).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn evaluation_overview_ids(&self) -> Result<Vec<String>> {
        self.ids("evaluation_overviews").await
    }

    #[instrument(skip(self, evaluation), level = "debug")]
    async fn store_example_evaluation<E>(&self, evaluation: ExampleEvaluation<E>) -> Result<()>
    where
        E: Serialize + Send,
    {
        let result_json = serde_json::to_string(&evaluation.result)?;
        debug!(
            evaluation_id = %evaluation.evaluation_id,
            example_id = %evaluation.example_id,
            "storing example evaluation"
        );

        let _guard = self.write_lock.lock().await;
        let tx = self.conn.transaction().await?;
        let written = async {
            Self::register_evaluation(&tx, &evaluation.evaluation_id).await?;
            tx.execute(
                "INSERT INTO example_evaluations (evaluation_id, example_id, result) VALUES (?, ?, ?)",
                libsql::params![
                    evaluation.evaluation_id.clone(),
                    evaluation.example_id.clone(),
                    result_json
                ],
            )
            .await?;
            Ok::<_, Error>(())
        }
        .await;
        Self::finish(tx, written).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn example_evaluations<E>(&self, evaluation_id: &str) -> Result<Vec<ExampleEvaluation<E>>>
    where
        E: DeserializeOwned + Send,
    {
        if !self.is_registered(evaluation_id).await? {
            return Err(Error::EvaluationNotFound(evaluation_id.to_string()));
        }

        let mut rows = self
            .conn
            .query(
                "SELECT evaluation_id, example_id, result FROM example_evaluations WHERE evaluation_id = ? ORDER BY example_id ASC, seq ASC",
                [evaluation_id.to_string()],
            )
            .await?;

        let mut evaluations = Vec::new();
        while let Some(row) = rows.next().await? {
            evaluations.push(Self::parse_example_evaluation(&row)?);
        }
        Ok(evaluations)
    }
}

#[async_trait]
impl AsyncEvaluationRepository for TursoEvaluationRepository {
    #[instrument(skip(self, overview), fields(id = %overview.id), level = "debug")]
    async fn store_partial_evaluation_overview(
        &self,
        overview: PartialEvaluationOverview,
    ) -> Result<()> {
        let json = serde_json::to_string(&overview)?;
        self.store_overview_json("partial_evaluation_overviews", &overview.id, json)
            .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn partial_evaluation_overview(
        &self,
        evaluation_id: &str,
    ) -> Result<Option<PartialEvaluationOverview>> {
        self.load_json("partial_evaluation_overviews", evaluation_id)
            .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn partial_evaluation_overview_ids(&self) -> Result<Vec<String>> {
        self.ids("partial_evaluation_overviews").await
    }
}
