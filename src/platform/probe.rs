//! Best-effort GPU discovery
//!
//! Every query here may fail (unsupported platform, missing driver, missing
//! tool). Failures collapse to "no information" and are only logged at debug.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use super::Platform;

/// One GPU adapter as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuAdapter {
    pub index: u32,
    pub name: String,
}

impl GpuAdapter {
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Source of GPU adapter information.
///
/// `None` means the query could not be answered, which callers must treat
/// the same as "no vendor information available".
pub trait DeviceProbe {
    fn adapters(&self) -> Option<Vec<GpuAdapter>>;
}

/// Queries the running system for its display adapters
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDeviceProbe;

impl DeviceProbe for SystemDeviceProbe {
    fn adapters(&self) -> Option<Vec<GpuAdapter>> {
        let adapters = match Platform::current() {
            Platform::Linux => linux_drm_adapters(Path::new("/sys/class/drm")),
            Platform::Windows => windows_video_controllers(),
            Platform::MacOS | Platform::Unknown => None,
        };
        log::debug!("GPU adapters: {:?}", adapters);
        adapters
    }
}

/// Returns a fixed answer; used by tests and by callers that already know
/// their hardware
#[derive(Debug, Default, Clone)]
pub struct StaticDeviceProbe {
    adapters: Option<Vec<GpuAdapter>>,
}

impl StaticDeviceProbe {
    pub fn new(adapters: Vec<GpuAdapter>) -> Self {
        Self {
            adapters: Some(adapters),
        }
    }

    /// A probe whose query always fails
    pub fn unavailable() -> Self {
        Self { adapters: None }
    }

    /// Build adapters from bare names, indexed in order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let adapters = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| GpuAdapter::new(i as u32, name))
            .collect();
        Self::new(adapters)
    }
}

impl DeviceProbe for StaticDeviceProbe {
    fn adapters(&self) -> Option<Vec<GpuAdapter>> {
        self.adapters.clone()
    }
}

/// Acceleration facts that feed codec selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareHints {
    /// A general-purpose compute accelerator (CUDA device) is usable
    pub compute_accelerator: bool,
    pub platform: Platform,
}

impl HardwareHints {
    pub fn new(platform: Platform, compute_accelerator: bool) -> Self {
        Self {
            compute_accelerator,
            platform,
        }
    }

    /// Inspect the running host
    pub fn detect() -> Self {
        Self {
            compute_accelerator: cuda_device_present(),
            platform: Platform::current(),
        }
    }
}

fn cuda_device_present() -> bool {
    let output = match Command::new("nvidia-smi")
        .arg("-L")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(o) => o,
        Err(e) => {
            log::debug!("nvidia-smi unavailable: {}", e);
            return false;
        }
    };

    output.status.success() && count_nvidia_smi_gpus(&String::from_utf8_lossy(&output.stdout)) > 0
}

/// Count `GPU n: ...` lines in `nvidia-smi -L` output
fn count_nvidia_smi_gpus(stdout: &str) -> usize {
    stdout
        .lines()
        .filter(|line| line.trim_start().starts_with("GPU "))
        .count()
}

fn linux_drm_adapters(drm_root: &Path) -> Option<Vec<GpuAdapter>> {
    let entries = match fs::read_dir(drm_root) {
        Ok(e) => e,
        Err(e) => {
            log::debug!("Cannot read {:?}: {}", drm_root, e);
            return None;
        }
    };

    let mut adapters = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(index) = parse_card_index(&name.to_string_lossy()) else {
            continue;
        };

        let Ok(vendor) = fs::read_to_string(entry.path().join("device").join("vendor")) else {
            continue;
        };
        let vendor = vendor.trim();
        let device = fs::read_to_string(entry.path().join("device").join("device"))
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        let label = vendor_name(vendor).unwrap_or("Unknown");
        adapters.push(GpuAdapter::new(index, format!("{} ({}:{})", label, vendor, device)));
    }

    adapters.sort_by_key(|a| a.index);
    Some(adapters)
}

/// `card0` -> 0; connector entries such as `card0-HDMI-A-1` are skipped
fn parse_card_index(name: &str) -> Option<u32> {
    name.strip_prefix("card")?.parse().ok()
}

/// Map a PCI vendor id (`0x1002`) to a vendor label
fn vendor_name(pci_vendor: &str) -> Option<&'static str> {
    match pci_vendor.to_ascii_lowercase().as_str() {
        "0x1002" | "0x1022" => Some("AMD"),
        "0x10de" => Some("NVIDIA"),
        "0x8086" => Some("Intel"),
        _ => None,
    }
}

fn windows_video_controllers() -> Option<Vec<GpuAdapter>> {
    let output = Command::new("powershell")
        .args([
            "-NoProfile",
            "-Command",
            "Get-CimInstance Win32_VideoController | ForEach-Object { $_.Name }",
        ])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| log::debug!("Video controller query failed: {}", e))
        .ok()?;

    if !output.status.success() {
        return None;
    }

    Some(parse_controller_names(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_controller_names(stdout: &str) -> Vec<GpuAdapter> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, name)| GpuAdapter::new(i as u32, name))
        .collect()
}
