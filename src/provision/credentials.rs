/// Deterministic OSCORE identifiers for bulk-provisioned devices.
///
/// Device `n` (1-based) gets master secret `hex(n)`, sender id `hex(2n)`
/// and recipient id `hex(2n + 1)`, uppercase and zero-padded to 4/2/2
/// digits. Consecutive devices therefore never share an id within a run.
/// Values wider than the padding are emitted in full, never truncated.
use serde::{Deserialize, Serialize};

/// OSCORE credential triple, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OscoreCredential {
    pub master_secret: String,
    pub sender_id: String,
    pub recipient_id: String,
}

/// Derive the credential for the device at `sequence_index` (starting at 1).
pub fn derive_credential(sequence_index: u32) -> OscoreCredential {
    let n = u64::from(sequence_index);

    OscoreCredential {
        master_secret: format!("{n:04X}"),
        sender_id: format!("{:02X}", n * 2),
        recipient_id: format!("{:02X}", n * 2 + 1),
    }
}
