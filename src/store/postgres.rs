use anyhow::Context;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Postgres, Row, Transaction,
};

use crate::error::{CatalogueError, Result};
use crate::model::{Id, Method, MethodParameterMap, Parameter};
use crate::store::traits::{MethodParameterLinker, MethodStore, ParameterStore, Store, StoreTx};

const PARAMETER_COLUMNS: &str = "p.id, p.name, p.default_value, p.required, p.constrained_options, \
     p.created_by, p.created_at, p.updated_by, p.updated_at";

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(Box::new(PgTx { tx }))
    }
}

/// A store transaction. Rolled back by sqlx when dropped uncommitted.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl StoreTx for PgTx {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit transaction")?;
        Ok(())
    }
}

fn parameter_from_row(row: &PgRow) -> Parameter {
    Parameter {
        id: row.get("id"),
        name: row.get("name"),
        default_value: row.get("default_value"),
        required: row.get("required"),
        constrained_options: row.get("constrained_options"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_by: row.get("updated_by"),
        updated_at: row.get("updated_at"),
    }
}

fn link_from_row(row: &PgRow) -> MethodParameterMap {
    MethodParameterMap {
        method_id: row.get("method_id"),
        parameter_id: row.get("parameter_id"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

fn database_error_code(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

#[async_trait::async_trait]
impl ParameterStore for PgTx {
    async fn get_parameter(&mut self, id: &Id) -> Result<Option<Parameter>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM parameters p WHERE p.id = $1",
            PARAMETER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch parameter")?;

        Ok(row.as_ref().map(parameter_from_row))
    }

    async fn find_parameter_by_name(&mut self, name: &str) -> Result<Option<Parameter>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM parameters p
            LEFT JOIN (
                SELECT parameter_id, COUNT(*) AS links
                FROM method_parameter_map
                GROUP BY parameter_id
            ) c ON c.parameter_id = p.id
            WHERE p.name = $1
            ORDER BY (COALESCE(c.links, 0) > 1) DESC, p.created_at, p.id
            LIMIT 1
            "#,
            PARAMETER_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to look up parameter by name")?;

        Ok(row.as_ref().map(parameter_from_row))
    }

    async fn insert_parameter(&mut self, parameter: &Parameter) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO parameters (id, name, default_value, required, constrained_options,
                                    created_by, created_at, updated_by, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&parameter.id)
        .bind(&parameter.name)
        .bind(&parameter.default_value)
        .bind(parameter.required)
        .bind(&parameter.constrained_options)
        .bind(&parameter.created_by)
        .bind(parameter.created_at)
        .bind(&parameter.updated_by)
        .bind(parameter.updated_at)
        .execute(&mut *self.tx)
        .await
        .context("Failed to insert parameter")?;

        Ok(())
    }

    async fn save_parameter(&mut self, parameter: &Parameter) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE parameters SET
                default_value = $2,
                required = $3,
                constrained_options = $4,
                updated_by = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(&parameter.id)
        .bind(&parameter.default_value)
        .bind(parameter.required)
        .bind(&parameter.constrained_options)
        .bind(&parameter.updated_by)
        .bind(parameter.updated_at)
        .execute(&mut *self.tx)
        .await
        .context("Failed to update parameter")?;

        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found("parameter", parameter.id.clone()));
        }
        Ok(())
    }

    async fn delete_parameter_if_orphaned(&mut self, id: &Id) -> Result<bool> {
        // The row lock blocks concurrent links (their FK check) and makes a
        // concurrent unlink of the same parameter wait; the count below runs
        // after the lock is granted and therefore sees the other side's commit.
        let locked = sqlx::query("SELECT id FROM parameters WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .context("Failed to lock parameter")?;
        if locked.is_none() {
            return Ok(false);
        }

        let links: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM method_parameter_map WHERE parameter_id = $1")
                .bind(id)
                .fetch_one(&mut *self.tx)
                .await
                .context("Failed to count parameter links")?;
        if links > 0 {
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM parameters WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .context("Failed to delete parameter")?;

        Ok(result.rows_affected() > 0)
    }

    async fn orphaned_parameter_ids(&mut self) -> Result<Vec<Id>> {
        let ids: Vec<Id> = sqlx::query_scalar(
            r#"
            SELECT p.id FROM parameters p
            WHERE NOT EXISTS (
                SELECT 1 FROM method_parameter_map m WHERE m.parameter_id = p.id
            )
            ORDER BY p.id
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list orphaned parameters")?;

        Ok(ids)
    }
}

#[async_trait::async_trait]
impl MethodParameterLinker for PgTx {
    async fn link(
        &mut self,
        method_id: &Id,
        parameter_id: &Id,
        created_by: &str,
    ) -> Result<MethodParameterMap> {
        if self.find_link(method_id, parameter_id).await?.is_some() {
            return Err(CatalogueError::Conflict {
                method_id: method_id.clone(),
                parameter_id: parameter_id.clone(),
            });
        }

        let link = MethodParameterMap::new(method_id, parameter_id, created_by);
        let inserted = sqlx::query(
            r#"
            INSERT INTO method_parameter_map (method_id, parameter_id, created_by, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&link.method_id)
        .bind(&link.parameter_id)
        .bind(&link.created_by)
        .bind(link.created_at)
        .execute(&mut *self.tx)
        .await;

        match inserted {
            Ok(_) => Ok(link),
            Err(err) => match database_error_code(&err).as_deref() {
                Some(UNIQUE_VIOLATION) => Err(CatalogueError::Conflict {
                    method_id: method_id.clone(),
                    parameter_id: parameter_id.clone(),
                }),
                Some(FOREIGN_KEY_VIOLATION) => Err(CatalogueError::not_found(
                    "method or parameter",
                    format!("{}/{}", method_id, parameter_id),
                )),
                _ => Err(anyhow::Error::new(err)
                    .context("Failed to insert method parameter link")
                    .into()),
            },
        }
    }

    async fn unlink(&mut self, method_id: &Id, parameter_id: &Id) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM method_parameter_map WHERE method_id = $1 AND parameter_id = $2",
        )
        .bind(method_id)
        .bind(parameter_id)
        .execute(&mut *self.tx)
        .await
        .context("Failed to delete method parameter link")?;

        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(
                "method parameter link",
                format!("{}/{}", method_id, parameter_id),
            ));
        }
        Ok(())
    }

    async fn link_count(&mut self, parameter_id: &Id) -> Result<usize> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM method_parameter_map WHERE parameter_id = $1")
                .bind(parameter_id)
                .fetch_one(&mut *self.tx)
                .await
                .context("Failed to count parameter links")?;

        Ok(count as usize)
    }

    async fn find_link(
        &mut self,
        method_id: &Id,
        parameter_id: &Id,
    ) -> Result<Option<MethodParameterMap>> {
        let row = sqlx::query(
            r#"
            SELECT method_id, parameter_id, created_by, created_at
            FROM method_parameter_map
            WHERE method_id = $1 AND parameter_id = $2
            "#,
        )
        .bind(method_id)
        .bind(parameter_id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch method parameter link")?;

        Ok(row.as_ref().map(link_from_row))
    }

    async fn parameters_for_method(&mut self, method_id: &Id) -> Result<Vec<Parameter>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM method_parameter_map m
            JOIN parameters p ON p.id = m.parameter_id
            WHERE m.method_id = $1
            ORDER BY m.created_at, p.id
            "#,
            PARAMETER_COLUMNS
        ))
        .bind(method_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list method parameters")?;

        Ok(rows.iter().map(parameter_from_row).collect())
    }
}

#[async_trait::async_trait]
impl MethodStore for PgTx {
    async fn get_method(&mut self, id: &Id) -> Result<Option<Method>> {
        let row = sqlx::query(
            "SELECT id, resource_id, http_verb, path, created_at FROM methods WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch method")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Method {
            id: row.get("id"),
            resource_id: row.get("resource_id"),
            http_verb: row.get("http_verb"),
            path: row.get("path"),
            created_at: row.get("created_at"),
        }))
    }

    async fn upsert_method(&mut self, method: &Method) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO methods (id, resource_id, http_verb, path, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                resource_id = EXCLUDED.resource_id,
                http_verb = EXCLUDED.http_verb,
                path = EXCLUDED.path
            "#,
        )
        .bind(&method.id)
        .bind(&method.resource_id)
        .bind(&method.http_verb)
        .bind(&method.path)
        .bind(method.created_at)
        .execute(&mut *self.tx)
        .await
        .context("Failed to upsert method")?;

        Ok(())
    }
}
