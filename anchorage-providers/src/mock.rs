use anchorage_state::ProviderSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema of the in-process mock provider used for tests and dry-runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MockSchema;

impl ProviderSchema for MockSchema {
    const PROVIDER: &'static str = "mock";

    type ProvisionInput = MockProvisionInput;
    type ProvisionOutput = MockProvisionOutput;
    type ConfigurationInput = MockConfigurationInput;
    type ConfigurationOutput = MockConfigurationOutput;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockProvisionInput {
    pub zone: String,
    pub instance_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockProvisionOutput {
    pub server_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl MockProvisionOutput {
    /// Fabricate an output the way the mock provider allocates servers.
    pub fn fresh(ip_address: Option<String>) -> Self {
        Self {
            server_id: format!("mock-{}", uuid::Uuid::new_v4()),
            ip_address,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockConfigurationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_stop: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockConfigurationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured_at: Option<DateTime<Utc>>,
}
