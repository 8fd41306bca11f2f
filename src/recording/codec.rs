//! Video codec allow-list and hardware-aware selection

use serde::{Deserialize, Serialize};

use crate::platform::{DeviceProbe, HardwareHints, Platform};

/// Codecs the encoder may be asked for. Order matters: the last entry is the
/// software fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoCodec {
    /// NVIDIA NVENC, requires a CUDA-capable device
    HevcNvenc,
    /// AMD AMF, Windows only
    HevcAmf,
    /// VA-API, used for AMD on Linux
    HevcVaapi,
    /// Software H.264
    Libx264,
}

impl VideoCodec {
    pub const ALL: [VideoCodec; 4] = [
        VideoCodec::HevcNvenc,
        VideoCodec::HevcAmf,
        VideoCodec::HevcVaapi,
        VideoCodec::Libx264,
    ];

    pub const FALLBACK: VideoCodec = VideoCodec::Libx264;

    /// Identifier passed to `-vcodec`
    pub fn as_ffmpeg_codec(&self) -> &'static str {
        match self {
            VideoCodec::HevcNvenc => "hevc_nvenc",
            VideoCodec::HevcAmf => "hevc_amf",
            VideoCodec::HevcVaapi => "hevc_vaapi",
            VideoCodec::Libx264 => "libx264",
        }
    }

    /// Exact, case-sensitive lookup in the allow-list
    pub fn from_ffmpeg_codec(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_ffmpeg_codec() == name)
    }

    pub fn is_hardware(&self) -> bool {
        !matches!(self, VideoCodec::Libx264)
    }
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ffmpeg_codec())
    }
}

const AMD_VENDOR_TAG: &str = "AMD";

/// Pick the codec for a session.
///
/// A valid override always wins. An unknown override resolves to the
/// software fallback instead of failing. Without an override the choice is
/// NVENC when a compute accelerator is present, then AMF on Windows or
/// VA-API on Linux when an AMD adapter is visible, then software.
pub fn select_codec(
    codec_override: Option<&str>,
    hints: &HardwareHints,
    probe: &dyn DeviceProbe,
) -> VideoCodec {
    if let Some(requested) = codec_override.filter(|c| !c.is_empty()) {
        return match VideoCodec::from_ffmpeg_codec(requested) {
            Some(codec) => codec,
            None => {
                log::warn!(
                    "Unrecognised codec '{}', falling back to {}",
                    requested,
                    VideoCodec::FALLBACK
                );
                VideoCodec::FALLBACK
            }
        };
    }

    if hints.compute_accelerator {
        return VideoCodec::HevcNvenc;
    }

    match hints.platform {
        Platform::Windows if has_amd_adapter(probe) => VideoCodec::HevcAmf,
        Platform::Linux if has_amd_adapter(probe) => VideoCodec::HevcVaapi,
        _ => VideoCodec::FALLBACK,
    }
}

fn has_amd_adapter(probe: &dyn DeviceProbe) -> bool {
    probe
        .adapters()
        .map(|adapters| adapters.iter().any(|a| a.name.contains(AMD_VENDOR_TAG)))
        .unwrap_or(false)
}
