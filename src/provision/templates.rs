/// Fixed bootstrap and security templates for bulk provisioning.
///
/// Topology handed to every device:
///
/// ```text
/// /0/0  bootstrap server   coap://localhost:5683   OSCORE mode 0
/// /0/1  LwM2M server 123   coap://localhost:5783   OSCORE mode 1 -> /21/0
/// /1/0  server 123         binding U, lifetime 300 s
/// /21/0 OSCORE context     device credential, AES-CCM-16-64-128 / HKDF-SHA-256
/// EDHOC instance 1         static demo key material
/// ```
///
/// Only the endpoint name and the OSCORE credential vary per device.
use std::collections::BTreeMap;

use super::credentials::OscoreCredential;
use crate::upstream::models::{
    BootstrapConfig, EdhocEntry, EdhocSecurity, OscoreEntry, SecurityConfig, SecurityEntry,
    SecurityMode, ServerEntry, SmsSecurityMode,
};

pub const BOOTSTRAP_SERVER_URI: &str = "coap://localhost:5683";
pub const LWM2M_SERVER_URI: &str = "coap://localhost:5783";
pub const SHORT_SERVER_ID: u16 = 123;
pub const LIFETIME_SECS: u32 = 300;

/// COSE algorithm 10: AES-CCM-16-64-128.
const OSCORE_AEAD_ALGORITHM: i32 = 10;
/// COSE algorithm -10: HKDF SHA-256.
const OSCORE_HMAC_ALGORITHM: i32 = -10;

const OSCORE_MASTER_SECRET_LENGTH: &str = "16";
const OSCORE_MASTER_SALT_LENGTH: &str = "8";

const EDHOC_INSTANCE: u16 = 1;
const EDHOC_CIPHERSUITE: &str = "2";
const EDHOC_CREDENTIAL_ID: u8 = 0x07;
const EDHOC_SERVER_CREDENTIAL_ID: u8 = 0x24;

const EDHOC_PUBLIC_CREDENTIAL: [u8; 64] = [
    0x67, 0x59, 0x9a, 0x00, 0x25, 0x64, 0x35, 0xc1,
    0xe8, 0x51, 0x9f, 0x55, 0x5c, 0x47, 0xac, 0x1d,
    0x8b, 0x2f, 0xc2, 0x4c, 0x65, 0xa8, 0x38, 0x26,
    0x02, 0xb8, 0x65, 0xc6, 0x7f, 0xf8, 0x60, 0x54,
    0xb9, 0x9b, 0x12, 0x0a, 0x18, 0x79, 0x85, 0xe7,
    0x32, 0xde, 0x7e, 0x0e, 0xa7, 0xe9, 0x59, 0x64,
    0x9d, 0xb1, 0x5d, 0xd6, 0xec, 0xcf, 0xc0, 0xd8,
    0xee, 0xa4, 0x66, 0x2d, 0xd2, 0x15, 0x6a, 0xf9,
];

const EDHOC_PRIVATE_KEY: [u8; 32] = [
    0xdf, 0xc9, 0x19, 0x51, 0x8b, 0x1e, 0x5e, 0xef,
    0x2e, 0x4c, 0xf5, 0xa3, 0x28, 0x86, 0xfa, 0x96,
    0x1a, 0x05, 0x82, 0x6c, 0x25, 0xb6, 0x51, 0x8a,
    0x3b, 0x57, 0x92, 0x69, 0xa4, 0x71, 0xec, 0x44,
];

const EDHOC_SERVER_PUBLIC_KEY: [u8; 64] = [
    0xf5, 0x92, 0x4d, 0xd0, 0x7d, 0x48, 0x21, 0x7f,
    0xf8, 0x21, 0x97, 0xa7, 0x2e, 0xe0, 0xb7, 0x2f,
    0x2a, 0x8a, 0x97, 0x51, 0xdf, 0x4b, 0x7a, 0x1e,
    0x07, 0x45, 0x19, 0x0a, 0x3c, 0x56, 0x28, 0x80,
    0x5e, 0xf2, 0x42, 0xb5, 0x75, 0x57, 0x04, 0x9c,
    0x26, 0x8c, 0xc6, 0xb8, 0x61, 0xd4, 0x5b, 0x71,
    0xd8, 0x23, 0xa5, 0x7a, 0x8c, 0xe7, 0xb4, 0xb6,
    0x09, 0x91, 0x0d, 0x3e, 0xb5, 0x06, 0x42, 0x73,
];

/// Leading bytes of the server key record kept by the LwM2M server.
const EDHOC_SERVER_KEY_PREFIX: [u8; 32] = [
    0xd7, 0x09, 0xbf, 0xa1, 0xcb, 0x5c, 0x9b, 0x52,
    0xed, 0x7c, 0x29, 0x30, 0x09, 0x32, 0xf8, 0xec,
    0x99, 0x77, 0x21, 0xe1, 0x6d, 0xc7, 0x77, 0xb4,
    0x70, 0xee, 0x64, 0xc5, 0xde, 0x87, 0x1b, 0x2d,
];

/// Object paths wiped before the bootstrap write: Security, Server, OSCORE.
const TO_DELETE: [&str; 3] = ["/0", "/1", "/21"];

/// Build the bootstrap configuration for one device.
///
/// The endpoint travels in the request path, so the body leaves it unset.
pub fn build_bootstrap_config(_endpoint: &str, credential: &OscoreCredential) -> BootstrapConfig {
    let servers = BTreeMap::from([(
        0,
        ServerEntry {
            binding: "U".to_string(),
            default_min_period: 1,
            lifetime: LIFETIME_SECS,
            notif_if_disabled: true,
            short_id: SHORT_SERVER_ID,
        },
    )]);

    let security = BTreeMap::from([
        (
            0,
            SecurityEntry {
                bootstrap_server: true,
                oscore_security_mode: Some(0),
                ..security_entry(BOOTSTRAP_SERVER_URI)
            },
        ),
        (
            1,
            SecurityEntry {
                bootstrap_server: false,
                server_id: Some(SHORT_SERVER_ID),
                oscore_security_mode: Some(1),
                ..security_entry(LWM2M_SERVER_URI)
            },
        ),
    ]);

    let oscore = BTreeMap::from([(
        0,
        OscoreEntry {
            oscore_master_secret: credential.master_secret.clone(),
            oscore_sender_id: credential.sender_id.clone(),
            oscore_recipient_id: credential.recipient_id.clone(),
            oscore_aead_algorithm: OSCORE_AEAD_ALGORITHM,
            oscore_hmac_algorithm: OSCORE_HMAC_ALGORITHM,
            oscore_master_salt: String::new(),
        },
    )]);

    let edhoc = BTreeMap::from([(
        EDHOC_INSTANCE,
        EdhocEntry {
            initiator: "True".to_string(),
            authentication_method: "0".to_string(),
            ciphersuite: EDHOC_CIPHERSUITE.to_string(),
            credential_identifier: vec![EDHOC_CREDENTIAL_ID],
            public_credential: EDHOC_PUBLIC_CREDENTIAL.to_vec(),
            private_key: EDHOC_PRIVATE_KEY.to_vec(),
            server_credential_identifier: vec![EDHOC_SERVER_CREDENTIAL_ID],
            server_public_key: EDHOC_SERVER_PUBLIC_KEY.to_vec(),
            oscore_master_secret_length: OSCORE_MASTER_SECRET_LENGTH.to_string(),
            oscore_master_salt_length: OSCORE_MASTER_SALT_LENGTH.to_string(),
            edhoc_oscore_combined: "False".to_string(),
        },
    )]);

    BootstrapConfig {
        endpoint: None,
        servers,
        security,
        oscore,
        edhoc,
        to_delete: TO_DELETE.iter().map(|p| p.to_string()).collect(),
    }
}

fn security_entry(uri: &str) -> SecurityEntry {
    SecurityEntry {
        client_old_off_time: 1,
        security_mode: SecurityMode::NoSec,
        sms_security_mode: SmsSecurityMode::NoSec,
        uri: uri.to_string(),
        ..SecurityEntry::default()
    }
}

/// Build the security configuration for one device.
///
/// Only the OSCORE master secret and salt lengths travel here, never the
/// credential values.
pub fn build_security_config(endpoint: &str, _credential: &OscoreCredential) -> SecurityConfig {
    let server_key: Vec<u8> = EDHOC_SERVER_KEY_PREFIX
        .iter()
        .chain(EDHOC_SERVER_PUBLIC_KEY.iter())
        .copied()
        .collect();

    SecurityConfig {
        endpoint: endpoint.to_string(),
        edhoc: Some(EdhocSecurity {
            initiator: "True".to_string(),
            authentication_method: "0".to_string(),
            ciphersuite: EDHOC_CIPHERSUITE.to_string(),
            credential_identifier: hex::encode_upper([EDHOC_CREDENTIAL_ID]),
            public_credential: hex::encode_upper(EDHOC_PUBLIC_CREDENTIAL),
            server_credential_identifier: hex::encode_upper([EDHOC_SERVER_CREDENTIAL_ID]),
            server_public_key: hex::encode_upper(server_key),
            oscore_master_secret_length: OSCORE_MASTER_SECRET_LENGTH.to_string(),
            oscore_master_salt_length: OSCORE_MASTER_SALT_LENGTH.to_string(),
            edhoc_oscore_combined: "False".to_string(),
        }),
    }
}
