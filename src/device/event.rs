use serde::{Deserialize, Serialize};

const EVENT_ADD: i32 = 1;
const EVENT_REMOVE: i32 = 2;
const EVENT_PAIRED: i32 = 3;

const CONNECTION_USBMUXD: i32 = 1;
const CONNECTION_NETWORK: i32 = 2;

/// Event as delivered by the native layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeviceEvent {
    pub event: i32,
    /// `None` when the native event carried a null UDID.
    pub udid: Option<String>,
    pub conn_type: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceEventKind {
    Add,
    Remove,
    Paired,
}

impl DeviceEventKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            EVENT_ADD => Some(DeviceEventKind::Add),
            EVENT_REMOVE => Some(DeviceEventKind::Remove),
            EVENT_PAIRED => Some(DeviceEventKind::Paired),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            DeviceEventKind::Add => EVENT_ADD,
            DeviceEventKind::Remove => EVENT_REMOVE,
            DeviceEventKind::Paired => EVENT_PAIRED,
        }
    }
}

/// How the device is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Usbmuxd,
    Network,
}

impl ConnectionType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            CONNECTION_USBMUXD => Some(ConnectionType::Usbmuxd),
            CONNECTION_NETWORK => Some(ConnectionType::Network),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            ConnectionType::Usbmuxd => CONNECTION_USBMUXD,
            ConnectionType::Network => CONNECTION_NETWORK,
        }
    }
}

/// A decoded device hot-plug event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub kind: DeviceEventKind,
    pub udid: String,
    pub connection: ConnectionType,
}

impl DeviceEvent {
    /// Decode a native event; `None` if any field is not understood.
    pub fn from_raw(raw: &RawDeviceEvent) -> Option<Self> {
        Some(Self {
            kind: DeviceEventKind::from_raw(raw.event)?,
            udid: raw.udid.clone()?,
            connection: ConnectionType::from_raw(raw.conn_type)?,
        })
    }

    pub fn new(kind: DeviceEventKind, udid: impl Into<String>, connection: ConnectionType) -> Self {
        Self {
            kind,
            udid: udid.into(),
            connection,
        }
    }

    /// The native representation of this event.
    pub fn to_raw(&self) -> RawDeviceEvent {
        RawDeviceEvent {
            event: self.kind.raw(),
            udid: Some(self.udid.clone()),
            conn_type: self.connection.raw(),
        }
    }
}
