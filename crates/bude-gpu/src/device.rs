//! Device enumeration and selection.
//!
//! Enumeration happens once at startup and produces an explicit
//! [`DeviceRegistry`] that is passed to whoever needs it. Selection accepts an
//! index into the registry or a substring of a device name.

use bude_core::{BudeError, Result};
use serde::Serialize;
use std::fmt;

/// Device category as reported in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Cpu,
    Gpu,
    Accelerator,
    Custom,
    Other,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::Cpu => "cpu",
            DeviceKind::Gpu => "gpu",
            DeviceKind::Accelerator => "accelerator",
            DeviceKind::Custom => "custom",
            DeviceKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Static description of a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    /// Human readable name used for substring selection
    pub name: String,
    pub kind: DeviceKind,
    pub vendor: String,
    pub version: String,
    pub driver_version: String,
    pub profile: String,
    /// Parallel execution units the device schedules work onto
    pub compute_units: usize,
}

impl DeviceInfo {
    /// Minimal description with the given name and category.
    pub fn named(name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            vendor: "unknown".to_string(),
            version: "unknown".to_string(),
            driver_version: "unknown".to_string(),
            profile: "FULL_PROFILE".to_string(),
            compute_units: 1,
        }
    }
}

/// An execution device queues can be bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    info: DeviceInfo,
    /// Optional cap on live shared-memory bytes
    shared_capacity: Option<usize>,
}

impl Device {
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            shared_capacity: None,
        }
    }

    /// Limits the shared memory queues on this device may hold live.
    pub fn with_shared_capacity(mut self, bytes: usize) -> Self {
        self.shared_capacity = Some(bytes);
        self
    }

    /// Host CPU device that runs kernels across all available cores.
    pub fn host_parallel() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(host_info(
            format!("Host CPU ({} threads, {})", threads, std::env::consts::ARCH),
            threads,
        ))
    }

    /// Host CPU device restricted to one worker thread.
    pub fn host_serial() -> Self {
        Self::new(host_info(
            format!("Host CPU (serial, {})", std::env::consts::ARCH),
            1,
        ))
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn kind(&self) -> DeviceKind {
        self.info.kind
    }

    /// Worker threads a queue on this device runs kernels with.
    pub fn worker_threads(&self) -> usize {
        self.info.compute_units.max(1)
    }

    pub fn shared_capacity(&self) -> Option<usize> {
        self.shared_capacity
    }
}

fn host_info(name: String, compute_units: usize) -> DeviceInfo {
    DeviceInfo {
        name,
        kind: DeviceKind::Cpu,
        vendor: std::env::consts::OS.to_string(),
        version: std::env::consts::FAMILY.to_string(),
        driver_version: format!("bude-gpu {}", env!("CARGO_PKG_VERSION")),
        profile: "FULL_PROFILE".to_string(),
        compute_units,
    }
}

/// How a selector resolved to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    /// The selector parsed as an in-range index
    Index,
    /// First device whose name contains the selector
    Substring,
    /// Nothing matched but the registry holds a single device
    SoleDeviceFallback,
}

/// Result of resolving a device selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub rule: SelectionRule,
}

/// Devices enumerated at startup.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    /// Enumerates the devices available to this process.
    pub fn enumerate() -> Result<Self> {
        let registry = Self::from_devices(vec![Device::host_parallel(), Device::host_serial()])?;
        log::info!("Enumerated {} devices", registry.len());
        Ok(registry)
    }

    /// Builds a registry from an explicit device list; an empty list is an error.
    pub fn from_devices(devices: Vec<Device>) -> Result<Self> {
        if devices.is_empty() {
            return Err(BudeError::NoDevices);
        }
        Ok(Self { devices })
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    /// Device used when no selector is given.
    pub fn default_device(&self) -> &Device {
        &self.devices[0]
    }

    /// Resolves `selector` to a device.
    ///
    /// An in-range index wins. Otherwise the first device whose name contains
    /// `selector` is used; with no match a lone device is used anyway, and with
    /// several devices the selector is rejected.
    pub fn select(&self, selector: &str) -> Result<Selection> {
        match selector.parse::<usize>() {
            Ok(index) if index < self.devices.len() => {
                return Ok(Selection {
                    index,
                    rule: SelectionRule::Index,
                });
            }
            _ => log::debug!(
                "Unable to select device index `{}`, matching by substring",
                selector
            ),
        }

        if let Some(index) = self
            .devices
            .iter()
            .position(|d| d.name().contains(selector))
        {
            return Ok(Selection {
                index,
                rule: SelectionRule::Substring,
            });
        }

        if self.devices.len() == 1 {
            log::warn!(
                "No device matches `{}` but there is only one device, using it anyway",
                selector
            );
            return Ok(Selection {
                index: 0,
                rule: SelectionRule::SoleDeviceFallback,
            });
        }

        Err(BudeError::NoMatchingDevice(selector.to_string()))
    }

    /// One line per device: `  0. name(kind)`.
    pub fn listing(&self) -> String {
        self.devices
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{:>3}. {}({})\n", i, d.name(), d.kind()))
            .collect()
    }
}
