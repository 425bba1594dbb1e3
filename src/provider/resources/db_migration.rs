//! aidbox_db_migration resource

use crate::aidbox::db_migration::{create_db_migration, get_db_migration, DbMigration};
use crate::aidbox::ApiClient;
use crate::provider::data::ResourceData;
use crate::provider::handler::{handle_not_found, ResourceHandler};
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;

pub struct DbMigrationHandler;

fn migration_to_data(migration: &DbMigration, data: &mut ResourceData) {
    data.set_id(migration.id.as_str());
    data.set("name", migration.id.as_str());
    data.set("sql", migration.sql.as_str());
}

#[async_trait]
impl ResourceHandler for DbMigrationHandler {
    fn type_name(&self) -> &'static str {
        "aidbox_db_migration"
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(
            "A database migration script to be run against the db. Migrations are permanent, once created you can't \
             update them. You can delete the resource, but the migration will remain in the database.\n\
             https://docs.aidbox.app/modules-1/aidbox-search/usdpsql#sql-migrations",
            [
                (
                    "name",
                    Attribute::string("Unique id of the migration, it can't be reused once applied").required(),
                ),
                ("sql", Attribute::string("SQL script to run").required()),
            ],
        )
        .with_base()
        .importable()
    }

    async fn create(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let migration = DbMigration {
            id: data.get_str("name"),
            sql: data.get_str("sql"),
        };
        let created = create_db_migration(client, &migration, &data.box_id()).await?;
        tracing::info!("Applied migration {}", created.id);
        migration_to_data(&created, data);
        Ok(())
    }

    async fn read(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let result = get_db_migration(client, data.id(), &data.box_id()).await;
        match result {
            Ok(found) => {
                migration_to_data(&found, data);
                Ok(())
            }
            Err(e) if handle_not_found(&e, data) => Ok(()),
            Err(e) => Err(e.context(format!("Failed to read migration {}", data.id()))),
        }
    }

    async fn update(&self, _client: &ApiClient, _data: &mut ResourceData) -> Result<()> {
        bail!("Migrations cannot be updated. Add a new migration instead to achieve desired changes.")
    }

    async fn delete(&self, _client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        tracing::warn!(
            "**If you are deleting this box, ignore this message.**\n\
             Aidbox does not support deleting migrations:\n\
             - id '{}' will be remembered and it can't be used for new migrations\n\
             - if you want to undo the migration script you can do this by hand",
            data.id()
        );
        data.clear_id();
        Ok(())
    }

    async fn import(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let found = get_db_migration(client, data.id(), &data.box_id())
            .await
            .with_context(|| format!("Failed to import migration {}", data.id()))?;
        migration_to_data(&found, data);
        Ok(())
    }
}
