//! Document persistence for the two aggregate roots. Every society (and
//! user) is stored as one JSONB row; reads hand back the whole document and
//! writes replace it under an optimistic revision check.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::society::Society;
use crate::models::user::{User, UserKind};
use crate::utils::error::AppError;

pub mod seed;

/// A document plus the revision it was read at. Saving compares-and-swaps
/// on that revision, so a stale write surfaces as a conflict instead of
/// silently clobbering a concurrent update.
#[derive(Debug)]
pub struct Persisted<T> {
    pub revision: i64,
    pub doc: T,
}

#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

const CONCURRENT_UPDATE: &str = "The record was modified concurrently, please retry";

impl Db {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_societies(&self) -> Result<Vec<Persisted<Society>>, AppError> {
        let rows = sqlx::query_as::<_, (i64, Json<Society>)>(
            "SELECT revision, doc FROM societies ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_persisted).collect())
    }

    pub async fn society(&self, id: Uuid) -> Result<Persisted<Society>, AppError> {
        let row = sqlx::query_as::<_, (i64, Json<Society>)>(
            "SELECT revision, doc FROM societies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_persisted)
            .ok_or_else(|| AppError::NotFound("Society not found".to_string()))
    }

    pub async fn society_by_name(&self, name: &str) -> Result<Persisted<Society>, AppError> {
        let row = sqlx::query_as::<_, (i64, Json<Society>)>(
            "SELECT revision, doc FROM societies WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_persisted)
            .ok_or_else(|| AppError::NotFound("Society not found".to_string()))
    }

    pub async fn insert_society(&self, society: &Society) -> Result<(), AppError> {
        sqlx::query("INSERT INTO societies (id, name, revision, doc) VALUES ($1, $2, 0, $3)")
            .bind(society.id)
            .bind(&society.name)
            .bind(Json(society))
            .execute(&self.pool)
            .await
            .map_err(|err| map_insert_error(err, "Society"))?;
        Ok(())
    }

    pub async fn update_society(&self, persisted: &Persisted<Society>) -> Result<(), AppError> {
        let rows = sqlx::query(
            "UPDATE societies SET doc = $1, revision = revision + 1
             WHERE id = $2 AND revision = $3",
        )
        .bind(Json(&persisted.doc))
        .bind(persisted.doc.id)
        .bind(persisted.revision)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::Conflict(CONCURRENT_UPDATE.to_string()));
        }
        Ok(())
    }

    pub async fn delete_society(&self, id: Uuid) -> Result<(), AppError> {
        let rows = sqlx::query("DELETE FROM societies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NotFound("Society not found".to_string()));
        }
        Ok(())
    }

    pub async fn user_by_name_and_kind(
        &self,
        name: &str,
        kind: UserKind,
    ) -> Result<Persisted<User>, AppError> {
        let row = sqlx::query_as::<_, (i64, Json<User>)>(
            "SELECT revision, doc FROM users WHERE name = $1 AND doc->>'type' = $2",
        )
        .bind(name)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_persisted)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn student(&self, name: &str) -> Result<Persisted<User>, AppError> {
        self.user_by_name_and_kind(name, UserKind::Student)
            .await
            .map_err(|err| match err {
                AppError::NotFound(_) => AppError::NotFound("Student not found".to_string()),
                other => other,
            })
    }

    pub async fn students(&self) -> Result<Vec<Persisted<User>>, AppError> {
        let rows = sqlx::query_as::<_, (i64, Json<User>)>(
            "SELECT revision, doc FROM users WHERE doc->>'type' = 'Student' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_persisted).collect())
    }

    pub async fn admin_exists(&self) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE doc->>'type' = 'Admin')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query("INSERT INTO users (id, name, revision, doc) VALUES ($1, $2, 0, $3)")
            .bind(user.id)
            .bind(&user.name)
            .bind(Json(user))
            .execute(&self.pool)
            .await
            .map_err(|err| map_insert_error(err, "User"))?;
        Ok(())
    }

    pub async fn update_user(&self, persisted: &Persisted<User>) -> Result<(), AppError> {
        let rows = sqlx::query(
            "UPDATE users SET doc = $1, revision = revision + 1
             WHERE id = $2 AND revision = $3",
        )
        .bind(Json(&persisted.doc))
        .bind(persisted.doc.id)
        .bind(persisted.revision)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::Conflict(CONCURRENT_UPDATE.to_string()));
        }
        Ok(())
    }
}

fn into_persisted<T>((revision, Json(doc)): (i64, Json<T>)) -> Persisted<T> {
    Persisted { revision, doc }
}

fn map_insert_error(err: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::ValidationError(format!("{} already exists", what));
        }
    }
    AppError::DatabaseError(err)
}
