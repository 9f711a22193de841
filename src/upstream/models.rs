/// Wire models for the Leshan REST API.
///
/// Write models (`BootstrapConfig`, `SecurityConfig`) are what the
/// provisioning templates build and what the gateway accepts from callers.
/// Read models only declare the fields this crate relies on; anything else
/// the server sends is ignored on deserialization.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Bootstrap configuration ──

/// Bootstrap configuration for one endpoint, keyed by LwM2M instance id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// LwM2M Server objects (/1).
    #[serde(default)]
    pub servers: BTreeMap<u16, ServerEntry>,
    /// LwM2M Security objects (/0).
    #[serde(default)]
    pub security: BTreeMap<u16, SecurityEntry>,
    /// OSCORE objects (/21).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub oscore: BTreeMap<u16, OscoreEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub edhoc: BTreeMap<u16, EdhocEntry>,
    /// Object paths the bootstrap server deletes before writing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_delete: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerEntry {
    pub binding: String,
    pub default_min_period: u32,
    pub lifetime: u32,
    pub notif_if_disabled: bool,
    pub short_id: u16,
}

/// LwM2M security mode of a Security object instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityMode {
    Psk,
    Rpk,
    #[serde(rename = "X509")]
    X509,
    #[default]
    NoSec,
    Est,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmsSecurityMode {
    DtlsPsk,
    SecurePacket,
    #[default]
    NoSec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityEntry {
    pub bootstrap_server: bool,
    pub client_old_off_time: u32,
    pub public_key_or_id: Vec<u8>,
    pub secret_key: Vec<u8>,
    pub security_mode: SecurityMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<u16>,
    pub server_public_key: Vec<u8>,
    pub server_sms_number: String,
    pub sms_binding_key_param: Vec<u8>,
    pub sms_binding_key_secret: Vec<u8>,
    pub sms_security_mode: SmsSecurityMode,
    pub uri: String,
    /// Instance id of the OSCORE object linked to this security instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oscore_security_mode: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OscoreEntry {
    pub oscore_master_secret: String,
    pub oscore_sender_id: String,
    pub oscore_recipient_id: String,
    pub oscore_aead_algorithm: i32,
    pub oscore_hmac_algorithm: i32,
    pub oscore_master_salt: String,
}

/// EDHOC object instance. Key material travels as raw byte arrays here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdhocEntry {
    pub initiator: String,
    pub authentication_method: String,
    pub ciphersuite: String,
    pub credential_identifier: Vec<u8>,
    pub public_credential: Vec<u8>,
    pub private_key: Vec<u8>,
    pub server_credential_identifier: Vec<u8>,
    pub server_public_key: Vec<u8>,
    pub oscore_master_secret_length: String,
    pub oscore_master_salt_length: String,
    pub edhoc_oscore_combined: String,
}

// ── Security configuration ──

/// Security information the LwM2M server keeps for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edhoc: Option<EdhocSecurity>,
}

/// EDHOC parameters as the server stores them: hex strings, and only the
/// lengths of the OSCORE master secret and salt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdhocSecurity {
    pub initiator: String,
    pub authentication_method: String,
    pub ciphersuite: String,
    pub credential_identifier: String,
    pub public_credential: String,
    pub server_credential_identifier: String,
    pub server_public_key: String,
    pub oscore_master_secret_length: String,
    pub oscore_master_salt_length: String,
    pub edhoc_oscore_combined: String,
}

// ── Read models ──

/// A client currently registered with the LwM2M server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub endpoint: String,
    pub registration_id: String,
    #[serde(default)]
    pub registration_date: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "lwM2mVersion")]
    pub lwm2m_version: Option<String>,
    #[serde(default)]
    pub lifetime: Option<u64>,
    #[serde(default)]
    pub binding_mode: Option<String>,
    #[serde(default)]
    pub root_path: Option<String>,
    #[serde(default)]
    pub object_links: Vec<ObjectLink>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub queuemode: bool,
}

/// CoRE link advertised by a client at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLink {
    pub url: String,
    /// Link attributes (`ver`, `rt`, ...) are free-form by definition.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// Object model description served by `/api/objectspecs/{endpoint}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub instancetype: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resourcedefs: Vec<ResourceSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub operations: Option<String>,
    #[serde(default)]
    pub instancetype: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Bootstrap listing: endpoint name to its stored configuration.
pub type BootstrapConfigs = BTreeMap<String, BootstrapConfig>;
