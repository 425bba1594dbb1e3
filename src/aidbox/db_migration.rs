//! SQL migrations
//!
//! `/db/migrations` accepts an array of `{id, sql}` and answers with the
//! migrations it applied. Migrations are permanent: there is no endpoint to
//! change or remove one.

use super::client::ApiClient;
use super::error::AidboxError;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

const MIGRATIONS_PATH: &str = "db/migrations";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbMigration {
    pub id: String,
    pub sql: String,
}

fn find_migration(id: &str, migrations: Vec<DbMigration>) -> Option<DbMigration> {
    migrations.into_iter().find(|m| m.id == id)
}

/// Apply a migration and return it as reported by the server
pub async fn create_db_migration(
    client: &ApiClient,
    migration: &DbMigration,
    box_id: &str,
) -> Result<DbMigration> {
    let applied: Vec<DbMigration> = client
        .post_json(MIGRATIONS_PATH, &[migration], box_id)
        .await?;

    match find_migration(&migration.id, applied) {
        Some(created) => Ok(created),
        None => bail!(
            "failed to create migration with id: {}, response did not contain the requested migration id",
            migration.id
        ),
    }
}

/// Find an applied migration by id
pub async fn get_db_migration(client: &ApiClient, id: &str, box_id: &str) -> Result<DbMigration> {
    let applied: Vec<DbMigration> = client.get_json(MIGRATIONS_PATH, box_id).await?;
    find_migration(id, applied).ok_or_else(|| AidboxError::NotFound.into())
}
