//! Host platform detection and GPU device probing
//!
//! Codec selection needs two facts about the host: which operating-system
//! family it runs on, and which GPU adapters it can see. Both are gathered
//! here so the selector itself stays a pure function of its inputs.

mod probe;

pub use probe::{
    DeviceProbe, GpuAdapter, HardwareHints, StaticDeviceProbe, SystemDeviceProbe,
};

use serde::{Deserialize, Serialize};

/// Operating-system family the process is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    Unknown,
}

impl Platform {
    /// Detect the platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOS => "Darwin",
            Platform::Linux => "Linux",
            Platform::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
