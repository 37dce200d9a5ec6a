use anchorage_state::ProviderSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema of states owned by the Scaleway provisioning flow.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalewaySchema;

impl ProviderSchema for ScalewaySchema {
    const PROVIDER: &'static str = "scaleway";

    type ProvisionInput = ScalewayProvisionInput;
    type ProvisionOutput = ScalewayProvisionOutput;
    type ConfigurationInput = ScalewayConfigurationInput;
    type ConfigurationOutput = ScalewayConfigurationOutput;
}

/// What the caller asked Scaleway for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalewayProvisionInput {
    /// Availability zone, e.g. `fr-par-2`.
    pub zone: String,
    /// Instance commercial type, e.g. `L4-1-24G`.
    pub commercial_type: String,
    pub image_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Extra Block Storage to attach after boot, when the type needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_volume_size_gb: Option<u64>,
}

/// What provisioning produced; absent until the create call has succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalewayProvisionOutput {
    pub server_id: String,
    pub zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_volume_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalewayConfigurationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_stop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_init: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalewayConfigurationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_version: Option<String>,
}
