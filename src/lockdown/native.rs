use crate::codec::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-side pairing material presented to the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PairRecord {
    pub device_certificate: Option<String>,
    pub host_certificate: Option<String>,
    pub root_certificate: Option<String>,
    #[serde(rename = "HostID")]
    pub host_id: Option<String>,
    #[serde(rename = "SystemBUID")]
    pub system_buid: Option<String>,
}

/// Where a started service is listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub port: u16,
    pub ssl_enabled: bool,
}

/// An open lockdown session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A native lockdown connection.
///
/// Calls return the native code; `Ok(None)` stands for a success code with
/// no output, which callers treat as a broken native contract.
pub trait NativeLockdown: Send + Sync {
    fn set_label(&self, label: Option<&str>);

    fn device_udid(&self) -> Result<Option<String>, i32>;

    fn device_name(&self) -> Result<Option<String>, i32>;

    fn query_type(&self) -> Result<Option<String>, i32>;

    fn sync_data_classes(&self) -> Result<Option<Vec<String>>, i32>;

    fn get_value(&self, domain: Option<&str>, key: Option<&str>) -> Result<Option<Node>, i32>;

    fn set_value(&self, domain: &str, key: &str, value: Node) -> i32;

    fn remove_value(&self, domain: &str, key: &str) -> i32;

    /// Start `identifier`, optionally sending the escrow bag to unlock it.
    fn start_service(
        &self,
        identifier: &str,
        escrow_bag: bool,
    ) -> Result<Option<ServiceDescriptor>, i32>;

    /// Returns the session id and whether the session switched to SSL.
    fn start_session(&self, host_id: &str) -> Result<Option<(String, bool)>, i32>;

    fn stop_session(&self, session_id: &str) -> i32;

    fn send(&self, message: &Node) -> i32;

    fn receive(&self) -> Result<Option<Node>, i32>;

    fn pair(&self, record: Option<&PairRecord>, options: &Node) -> Result<Option<Node>, i32>;

    fn validate_pair(&self, record: &PairRecord) -> i32;

    fn unpair(&self, record: &PairRecord) -> i32;

    fn activate(&self, activation_record: &Node) -> i32;

    fn deactivate(&self) -> i32;

    fn enter_recovery(&self) -> i32;

    fn goodbye(&self) -> i32;
}

/// Opens native lockdown connections to a device.
pub trait LockdownConnector {
    type Connection: NativeLockdown;

    fn connect(
        &self,
        udid: &str,
        label: Option<&str>,
        handshake: bool,
    ) -> Result<Option<Self::Connection>, i32>;
}
