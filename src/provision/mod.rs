/// Pure building blocks for bulk provisioning.
///
/// - `endpoints`: validated naming template → ordered endpoint names
/// - `credentials`: device sequence number → OSCORE credential triple
/// - `templates`: endpoint + credential → bootstrap and security configs
///
/// Nothing here performs I/O; the `pipeline` module drives the upstream
/// calls.
pub mod credentials;
pub mod endpoints;
pub mod templates;

pub use credentials::{derive_credential, OscoreCredential};
pub use endpoints::{generate_endpoints, DeviceTemplate, GenerateRequest};
pub use templates::{build_bootstrap_config, build_security_config};
