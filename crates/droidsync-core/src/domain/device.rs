//! Device identity and session values
//!
//! A [`Device`] is identified by the string the bridge listing prints for it:
//! a USB serial like `R58M12ABCDE` or a network endpoint like
//! `192.168.1.42:5555`. A [`DeviceSession`] wraps a device that has been
//! verified against a fresh listing; operations take a session by reference
//! instead of reading ambient "current device" state.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Bridge-level device identifier (serial or `ip:port`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Infers how the device is attached from the identifier shape.
    ///
    /// Network endpoints always carry a `:port` suffix in the listing;
    /// USB serials never contain a colon.
    #[must_use]
    pub fn connection_kind(&self) -> ConnectionKind {
        if self.0.contains(':') {
            ConnectionKind::Network
        } else {
            ConnectionKind::Usb
        }
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How a device is attached to the workstation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Usb,
    Network,
}

/// State a device reports in the bridge listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Attached and ready for commands
    Device,
    /// Known to the bridge but not responding
    Offline,
    /// Attached but the device has not authorized this workstation
    Unauthorized,
    /// Not present in the listing at all
    Absent,
}

impl DeviceState {
    /// Parses a listing state keyword. Unknown keywords (including the
    /// listing header tokens) yield `None` so callers can skip the line.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "device" => Some(DeviceState::Device),
            "offline" => Some(DeviceState::Offline),
            "unauthorized" => Some(DeviceState::Unauthorized),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, DeviceState::Device)
    }
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceState::Device => "device",
            DeviceState::Offline => "offline",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Absent => "absent",
        };
        write!(f, "{s}")
    }
}

/// A device known to the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    id: DeviceId,
    /// Display name (`ro.product.model`), fetched lazily and best-effort
    model: Option<String>,
    kind: ConnectionKind,
}

impl Device {
    /// Creates a device from its listing identifier alone.
    pub fn from_id(id: DeviceId) -> Self {
        let kind = id.connection_kind();
        Self {
            id,
            model: None,
            kind,
        }
    }

    /// Attaches the display name fetched from the device.
    ///
    /// An empty string means the fetch failed; the name stays unset.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.is_empty() {
            self.model = Some(model);
        }
        self
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }

    /// Human-facing label: `id (model)` when the model is known.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.model {
            Some(model) => format!("{} ({})", self.id, model),
            None => self.id.to_string(),
        }
    }
}

/// An established, verified connection to one device
///
/// Produced by the connection manager after the device has been confirmed
/// present in a fresh listing with state `device`. Only one session drives
/// a given operation; a new connect replaces the value rather than mutating
/// shared state.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    device: Device,
}

impl DeviceSession {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn id(&self) -> &DeviceId {
        self.device.id()
    }
}
