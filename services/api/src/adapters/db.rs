//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `SolutionStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use math_mentor_core::domain::SolutionRecord;
use math_mentor_core::ports::{PortError, PortResult, SolutionStore};
use sqlx::PgPool;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SolutionStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// `SolutionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SolutionStore for DbAdapter {
    async fn insert_solution(&self, record: SolutionRecord) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO math_solutions (id, image_key, problem_text, solution_text, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.id)
        .bind(&record.image_key)
        .bind(&record.problem_text)
        .bind(&record.solution_text)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(())
    }
}
