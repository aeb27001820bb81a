//! Stateless pixel-level detectors.
//!
//! Sheet overlays render on a black background, a blue marker bar in the
//! left columns announces a new tab line, and hands occlude the overlay
//! until a large frame-to-frame discontinuity. The thresholds below are
//! empirically tuned; they live in `DetectorConfig` so they can be
//! recalibrated without touching the scan control flow.

use crate::scanner::frame::{Frame, Orientation};

// Channel indices in an RGB-ordered frame.
const RED: usize = 0;
const GREEN: usize = 1;
const BLUE: usize = 2;

/// Empirical thresholds driving all three detectors and the scan phases.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Frame-index distance between two probes.
    pub probe_step: u64,
    /// A pixel is near-black when every channel is at or below this value.
    pub near_black: u8,
    /// Overlay counts as visible when the near-black pixel count stays
    /// at or below this ceiling.
    pub black_pixel_ceiling: usize,
    /// Row fraction of the overlay region used by the visibility test.
    pub visible_crop: f32,
    /// Row fraction of the overlay region used by the hand-clear test.
    pub diff_crop: f32,
    /// Rightmost column fraction compared between consecutive probes.
    pub diff_columns: f32,
    /// Minimum L1 difference marking the hand-clear event.
    pub diff_threshold: f64,
    /// How far past the start frame the hand-clear search may run.
    pub hand_window: u64,
    /// Frames to skip past the first sign of clearing, so selection lands
    /// after the clearing motion has finished.
    pub hand_lookahead: u64,
    /// Row fraction of the overlay region used by the new-line test.
    pub marker_crop: f32,
    /// Leftmost column fraction inspected for the marker bar.
    pub marker_columns: f32,
    /// Minimum blue-dominant pixel count for a new-line marker.
    pub blue_pixel_threshold: usize,
    /// Minimum frame-index distance between two accepted selections.
    pub cooldown: u64,
    /// Row fraction kept when exporting a line (larger than the detection
    /// crops so the full line content survives).
    pub export_crop: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            probe_step: 20,
            near_black: 10,
            black_pixel_ceiling: 50_000,
            visible_crop: 0.40,
            diff_crop: 0.40,
            diff_columns: 0.40,
            diff_threshold: 100_000.0,
            hand_window: 1_000,
            hand_lookahead: 40,
            marker_crop: 0.35,
            marker_columns: 0.20,
            blue_pixel_threshold: 8_000,
            cooldown: 120,
            export_crop: 0.45,
        }
    }
}

/// Count pixels whose channels are all at or below `near_black`.
pub fn black_pixel_count(frame: &Frame, near_black: u8) -> usize {
    frame
        .data
        .chunks_exact(3)
        .filter(|px| px.iter().all(|&c| c <= near_black))
        .count()
}

/// Whether the overlay region shows sheet content rather than a black
/// screen or transition.
pub fn is_sheet_visible(frame: &Frame, orientation: Orientation, cfg: &DetectorConfig) -> bool {
    let region = frame.overlay_region(orientation, cfg.visible_crop);
    black_pixel_count(&region, cfg.near_black) <= cfg.black_pixel_ceiling
}

/// L1 norm of the elementwise difference of normalized channel values.
///
/// Both frames must already be cropped identically. Zero for identical
/// frames, symmetric in its arguments, larger = more change.
pub fn frame_difference(a: &Frame, b: &Frame) -> f64 {
    debug_assert_eq!(a.data.len(), b.data.len());
    a.data
        .iter()
        .zip(b.data.iter())
        .map(|(&x, &y)| (x as f64 - y as f64).abs() / 255.0)
        .sum()
}

/// Count blue-dominant pixels in an RGB-ordered frame: blue strictly above
/// both other channels, with every channel above `near_black` so noisy
/// near-black pixels never qualify.
pub fn blue_pixel_count(frame: &Frame, near_black: u8) -> usize {
    frame
        .data
        .chunks_exact(3)
        .filter(|px| {
            px[BLUE] > px[RED] && px[BLUE] > px[GREEN] && px.iter().all(|&c| c > near_black)
        })
        .count()
}

/// Whether the left edge of the overlay region shows the colored marker
/// bar that announces a new tab line.
pub fn is_new_line_marker(frame: &Frame, orientation: Orientation, cfg: &DetectorConfig) -> bool {
    let region = frame
        .overlay_region(orientation, cfg.marker_crop)
        .to_rgb()
        .left_columns(cfg.marker_columns);
    blue_pixel_count(&region, cfg.near_black) >= cfg.blue_pixel_threshold
}
