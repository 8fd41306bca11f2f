//! Generated raw frames
//!
//! Frames are `bgr24`, the layout the recorder pipes to the encoder.

use crate::recording::Dimensions;

/// A moving gradient: content changes every frame so encoders see motion
pub fn synthetic_video_frame(frame_number: u64, dimensions: Dimensions) -> Vec<u8> {
    let width = dimensions.width as usize;
    let height = dimensions.height as usize;
    let mut data = vec![0u8; dimensions.frame_len()];

    let base = (frame_number % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) * 3;
            data[idx] = base.wrapping_add(((x + y) % 256) as u8); // B
            data[idx + 1] = base.wrapping_add((y % 256) as u8); // G
            data[idx + 2] = base.wrapping_add((x % 256) as u8); // R
        }
    }

    data
}

/// A single-colour frame, given as (blue, green, red)
pub fn solid_frame(dimensions: Dimensions, bgr: [u8; 3]) -> Vec<u8> {
    bgr.iter()
        .copied()
        .cycle()
        .take(dimensions.frame_len())
        .collect()
}
