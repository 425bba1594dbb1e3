//! aidbox_gcp_service_account resource

use crate::aidbox::gcp_service_account::GcpServiceAccount;
use crate::aidbox::resource::ResourceBase;
use crate::provider::data::ResourceData;
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::Result;

pub struct GcpServiceAccountMapping;

impl ResourceMapping for GcpServiceAccountMapping {
    type Model = GcpServiceAccount;

    const TYPE_NAME: &'static str = "aidbox_gcp_service_account";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "Aidbox GcpServiceAccount is a proprietary custom resource used to store Google Cloud Platform service account credentials for workload identity.",
            [
                (
                    "name",
                    Attribute::string("Computer friendly name of the GCP Service Account.")
                        .required()
                        .force_new(),
                ),
                (
                    "service_account_email",
                    Attribute::string("The email address of the GCP service account.").required(),
                ),
                (
                    "private_key",
                    Attribute::string("Private key of the service account. Leave empty when using workload identity.")
                        .optional()
                        .sensitive(),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<GcpServiceAccount> {
        Ok(GcpServiceAccount {
            base: ResourceBase::with_id(data.get_str("name")),
            service_account_email: data.get_str("service_account_email"),
            private_key: data.get_str("private_key"),
        })
    }

    fn to_data(account: &GcpServiceAccount, data: &mut ResourceData) -> Result<()> {
        data.set_id(account.base.id.as_str());
        data.set("name", account.base.id.as_str());
        data.set("service_account_email", account.service_account_email.as_str());
        // the server may withhold the key; keep the configured one then
        if !account.private_key.is_empty() {
            data.set("private_key", account.private_key.as_str());
        }
        Ok(())
    }
}
