//! Target bitrate estimation
//!
//! The reference point is 20 Mbps for 3840x2160 at 30 fps. The estimate
//! scales linearly with pixel count, and with frame rate only above 30 fps.

use super::config::Dimensions;

/// Bitrate in megabits per second for the 4K@30 reference
pub const REFERENCE_BITRATE_MBPS: f64 = 20.0;
/// Pixel count of the 4K reference
pub const REFERENCE_PIXELS: f64 = 3840.0 * 2160.0;
/// Frame rate of the reference
pub const REFERENCE_FPS: f64 = 30.0;

/// Estimate a bitrate (Mbps, 3 decimals) for the given geometry and rate
pub fn estimate_bitrate(dimensions: Dimensions, fps: f64) -> f64 {
    let pixels = dimensions.pixel_count() as f64;
    let rate = round3(fps / REFERENCE_FPS);
    let scale = if rate < 1.0 { 1.0 } else { rate };
    round3(REFERENCE_BITRATE_MBPS * (pixels / REFERENCE_PIXELS) * scale)
}

/// Use the explicit bitrate when there is one, otherwise estimate
pub fn resolve_bitrate(explicit: Option<f64>, dimensions: Dimensions, fps: f64) -> f64 {
    explicit.unwrap_or_else(|| estimate_bitrate(dimensions, fps))
}

/// Round half away from zero to three decimal places
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Render a bitrate for `-b:v`, without trailing zeros (`12.5M`, `20M`)
pub fn format_bitrate_arg(mbps: f64) -> String {
    format!("{}M", mbps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_is_twenty() {
        assert_eq!(estimate_bitrate(Dimensions::new(3840, 2160), 30.0), 20.0);
    }

    #[test]
    fn test_low_fps_does_not_scale_down() {
        let dims = Dimensions::new(1920, 1080);
        assert_eq!(estimate_bitrate(dims, 15.0), 5.0);
        assert_eq!(estimate_bitrate(dims, 30.0), 5.0);
    }

    #[test]
    fn test_high_fps_scales_up() {
        assert_eq!(estimate_bitrate(Dimensions::new(1920, 1080), 60.0), 10.0);
        // 1280x720 @ 30: 20 * 921600 / 8294400 = 2.2222 -> 2.222
        assert_eq!(estimate_bitrate(Dimensions::new(1280, 720), 30.0), 2.222);
        // 1280x720 @ 45: 2.2222 * 1.5 = 3.3333 -> 3.333
        assert_eq!(estimate_bitrate(Dimensions::new(1280, 720), 45.0), 3.333);
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let dims = Dimensions::new(640, 480);
        assert_eq!(resolve_bitrate(Some(8.0), dims, 30.0), 8.0);
        assert_eq!(resolve_bitrate(Some(0.0), dims, 30.0), 0.0);
        assert_eq!(resolve_bitrate(None, dims, 30.0), estimate_bitrate(dims, 30.0));
    }

    #[test]
    fn test_format_bitrate_arg() {
        assert_eq!(format_bitrate_arg(20.0), "20M");
        assert_eq!(format_bitrate_arg(2.222), "2.222M");
    }
}
