//! aidbox_user data source

use crate::aidbox::user::User;
use crate::aidbox::ApiClient;
use crate::provider::data::ResourceData;
use crate::provider::handler::{take_lookup_id, DataSourceHandler};
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::{Context, Result};
use async_trait::async_trait;

pub struct UserDataSource;

fn user_to_data(user: &User, data: &mut ResourceData) {
    data.set_id(user.base.id.as_str());
    data.set("two_factor_enabled", user.two_factor.enabled);
}

#[async_trait]
impl DataSourceHandler for UserDataSource {
    fn type_name(&self) -> &'static str {
        "aidbox_user"
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(
            "User https://docs.aidbox.app/modules/security-and-access-control/readme-1/overview#user",
            [
                ("id", Attribute::string("Id of the user").required()),
                (
                    "two_factor_enabled",
                    Attribute::bool("Whether two factor authentication is enabled for the user").computed(),
                ),
            ],
        )
        .with_base()
    }

    async fn read(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let id = take_lookup_id(data)?;
        let user: User = client
            .get(&id, &data.box_id())
            .await
            .with_context(|| format!("Failed to read user {}", id))?;
        user_to_data(&user, data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aidbox::resource::ResourceBase;
    use crate::aidbox::user::TwoFactor;

    #[test]
    fn test_user_to_data() {
        let user = User {
            base: ResourceBase::with_id("admin"),
            two_factor: TwoFactor { enabled: true },
        };
        let mut data = ResourceData::new();
        user_to_data(&user, &mut data);
        assert_eq!(data.id(), "admin");
        assert!(data.get_bool("two_factor_enabled"));
    }
}
