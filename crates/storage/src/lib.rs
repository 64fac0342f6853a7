use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{NewPizza, Pizza, PizzaId, PizzaSize};

mod memory;

pub use memory::MemoryStore;

/// The pizza collection. Implementations own identifier assignment and
/// serialize their own mutations.
#[async_trait]
pub trait PizzaStore: Send + Sync {
    /// Every pizza, ordered by ascending id.
    async fn list_pizzas(&self) -> Result<Vec<Pizza>>;
    /// Stores `pizza` under a fresh identifier and returns the stored entity.
    async fn add_pizza(&self, pizza: NewPizza) -> Result<Pizza>;
    /// Removes the pizza with `id`. Returns `false` when nothing matched.
    async fn delete_pizza(&self, id: PizzaId) -> Result<bool>;
    async fn health_check(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl PizzaStore for Storage {
    async fn list_pizzas(&self) -> Result<Vec<Pizza>> {
        let rows = sqlx::query(
            "SELECT id, name, size, is_gluten_free, price FROM pizzas ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list pizzas")?;
        rows.iter().map(pizza_from_row).collect()
    }

    async fn add_pizza(&self, pizza: NewPizza) -> Result<Pizza> {
        let rec = sqlx::query(
            "INSERT INTO pizzas (name, size, is_gluten_free, price) VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&pizza.name)
        .bind(pizza.size.as_str())
        .bind(pizza.is_gluten_free)
        .bind(pizza.price)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert pizza")?;
        let id = PizzaId(rec.get::<i64, _>(0));
        debug!(pizza_id = %id, name = %pizza.name, "pizza stored");
        Ok(pizza.into_pizza(id))
    }

    async fn delete_pizza(&self, id: PizzaId) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM pizzas WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .context("failed to delete pizza")?
            .rows_affected();
        debug!(pizza_id = %id, removed, "pizza delete executed");
        Ok(removed > 0)
    }

    async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

fn pizza_from_row(row: &SqliteRow) -> Result<Pizza> {
    let raw_size: String = row.try_get("size")?;
    let size = PizzaSize::from_str(&raw_size)
        .map_err(|e| anyhow!("corrupt pizza row: {e}"))?;
    Ok(Pizza {
        id: PizzaId(row.try_get("id")?),
        name: row.try_get("name")?,
        size,
        is_gluten_free: row.try_get("is_gluten_free")?,
        price: row.try_get("price")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
