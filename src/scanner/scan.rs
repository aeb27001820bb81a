//! Three-phase scan over the video: find the first frame with a visible
//! sheet overlay, find the frame where the performer's hands clear the
//! overlay, then collect one frame per tab line.

use log::{debug, info};
use thiserror::Error;

use crate::scanner::classifier::{self, DetectorConfig};
use crate::scanner::frame::{Frame, Orientation};
use crate::scanner::reader::FrameReader;
use crate::scanner::selection::{LineFilter, SheetFrameList};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no frame shows a sheet overlay before the video ends")]
    StartNotFound,
    #[error("no hand-clear event within {window} frames of frame {start}")]
    HandClearNotFound { start: u64, window: u64 },
}

/// Configuration for one scan run. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Frame index where the FindStart phase begins probing.
    pub start_index: u64,
    pub orientation: Orientation,
    /// Manual override: stop after this many selected lines.
    pub line_count: Option<usize>,
    /// Omission set and line-index bounds, applied at export time.
    pub filter: LineFilter,
    pub detector: DetectorConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_index: 1000,
            orientation: Orientation::TabBottom,
            line_count: None,
            filter: LineFilter::default(),
            detector: DetectorConfig::default(),
        }
    }
}

/// The phase the scan is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    FindStart,
    FindHandClear,
    FindLines,
}

impl ScanError {
    /// The phase the failure occurred in. FindLines has no failure modes;
    /// running out of video there is a normal termination.
    pub fn phase(&self) -> ScanPhase {
        match self {
            ScanError::StartNotFound => ScanPhase::FindStart,
            ScanError::HandClearNotFound { .. } => ScanPhase::FindHandClear,
        }
    }
}

/// Result of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// First probed frame with a visible overlay.
    pub start_frame: u64,
    /// Frame just past the hands-clearing motion; always line 1.
    pub hand_frame: u64,
    pub sheet_frames: SheetFrameList,
}

/// Unbounded sequence of probe indices advancing by a fixed step.
/// Termination comes from the caller: end-of-stream, a bounding
/// `take_while`, or the manual line count.
struct Probes {
    next: u64,
    step: u64,
}

impl Probes {
    fn new(start: u64, step: u64) -> Self {
        Self { next: start, step }
    }
}

impl Iterator for Probes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let probe = self.next;
        self.next += self.step;
        Some(probe)
    }
}

/// Drives a [`FrameReader`] through the three scan phases and accumulates
/// the selected sheet frames. All scan state is local to one `scan` call.
pub struct SheetScanner {
    config: ScanConfig,
}

impl SheetScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the full scan to completion or first fatal failure.
    pub fn scan<R: FrameReader>(&self, reader: &mut R) -> Result<ScanOutcome, ScanError> {
        let start_frame = self.find_start(reader)?;
        let hand_frame = self.find_hand_clear(reader, start_frame)?;
        let sheet_frames = self.find_lines(reader, hand_frame);
        Ok(ScanOutcome {
            start_frame,
            hand_frame,
            sheet_frames,
        })
    }

    /// Phase 1: probe forward until the overlay region stops being mostly
    /// black. End-of-stream here is fatal.
    fn find_start<R: FrameReader>(&self, reader: &mut R) -> Result<u64, ScanError> {
        let det = &self.config.detector;
        for probe in Probes::new(self.config.start_index, det.probe_step) {
            let Some(frame) = reader.read_frame(probe) else {
                return Err(ScanError::StartNotFound);
            };
            let region = frame.overlay_region(self.config.orientation, det.visible_crop);
            let black = classifier::black_pixel_count(&region, det.near_black);
            debug!("frame {probe}: {black} black pixels");

            if black <= det.black_pixel_ceiling {
                info!("sheet overlay first visible at frame {probe}");
                return Ok(probe);
            }
        }
        Err(ScanError::StartNotFound)
    }

    /// Phase 2: difference consecutive probes over the right side of the
    /// overlay region until the change spikes, then skip the lookahead
    /// offset so the selected frame lands after the clearing motion.
    fn find_hand_clear<R: FrameReader>(
        &self,
        reader: &mut R,
        start_frame: u64,
    ) -> Result<u64, ScanError> {
        let det = &self.config.detector;
        let mut reference: Option<Frame> = None;

        let window_end = start_frame + det.hand_window;
        for probe in Probes::new(start_frame, det.probe_step).take_while(|&p| p <= window_end) {
            let Some(frame) = reader.read_frame(probe) else {
                break;
            };
            let region = frame
                .overlay_region(self.config.orientation, det.diff_crop)
                .right_columns(det.diff_columns);

            if let Some(prev) = &reference {
                let diff = classifier::frame_difference(prev, &region);
                debug!("frame {probe}: difference {diff:.0}");

                if diff >= det.diff_threshold {
                    let hand_frame = probe + det.hand_lookahead;
                    info!("hands clear around frame {probe}, taking line 1 at {hand_frame}");
                    return Ok(hand_frame);
                }
            }
            reference = Some(region);
        }

        Err(ScanError::HandClearNotFound {
            start: start_frame,
            window: det.hand_window,
        })
    }

    /// Phase 3: probe forward indefinitely, selecting every probe that
    /// shows a new-line marker outside the cooldown distance. End-of-stream
    /// is the normal termination here, not a failure.
    fn find_lines<R: FrameReader>(&self, reader: &mut R, hand_frame: u64) -> SheetFrameList {
        let det = &self.config.detector;
        let mut selected = SheetFrameList::new();
        selected.push(hand_frame);

        if self.target_reached(&selected) {
            return selected;
        }

        for probe in Probes::new(hand_frame, det.probe_step) {
            // cooldown suppresses re-detecting the marker of the line we
            // just selected; checked before the read so cooled-down probes
            // cost nothing
            if selected.last().is_some_and(|last| probe <= last + det.cooldown) {
                continue;
            }

            let Some(frame) = reader.read_frame(probe) else {
                info!("end of stream after {} lines", selected.len());
                break;
            };
            let region = frame
                .overlay_region(self.config.orientation, det.marker_crop)
                .to_rgb()
                .left_columns(det.marker_columns);
            let blue = classifier::blue_pixel_count(&region, det.near_black);
            debug!("frame {probe}: {blue} blue pixels");

            if blue >= det.blue_pixel_threshold {
                info!("line {} starts at frame {probe}", selected.len() + 1);
                selected.push(probe);
                if self.target_reached(&selected) {
                    info!("reached requested line count {}", selected.len());
                    break;
                }
            }
        }

        selected
    }

    fn target_reached(&self, selected: &SheetFrameList) -> bool {
        self.config
            .line_count
            .is_some_and(|count| selected.len() >= count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::reader::SyntheticVideo;

    const WIDTH: u32 = 1920;
    const HEIGHT: u32 = 1080;

    fn solid(value: [u8; 3], index: u64) -> Frame {
        let data: Vec<u8> = value
            .iter()
            .copied()
            .cycle()
            .take((WIDTH * HEIGHT * 3) as usize)
            .collect();
        Frame::new(WIDTH, HEIGHT, data, index)
    }

    /// Sheet frame: light gray overlay, optionally with a blue marker bar
    /// in the left 20% of the overlay rows.
    fn sheet_frame(with_marker: bool, index: u64) -> Frame {
        let mut frame = solid([180, 180, 180], index);
        if with_marker {
            let bar_rows = (HEIGHT as f32 * 0.35) as u32;
            let bar_cols = (WIDTH as f32 * 0.20) as u32;
            for row in HEIGHT - bar_rows..HEIGHT {
                for col in 0..bar_cols {
                    let idx = ((row * WIDTH + col) * 3) as usize;
                    // BGR blue
                    frame.data[idx..idx + 3].copy_from_slice(&[255, 80, 40]);
                }
            }
        }
        frame
    }

    /// The synthetic lesson video from the end-to-end scenario:
    /// - frames 0..1000: pure black
    /// - frames 1000..1100: linear fade from black to a bright
    ///   "hands present" image
    /// - frames 1100..: static sheet, with a blue marker bar shown for
    ///   40 frames every 150 frames
    fn lesson_video(frame_count: u64) -> SyntheticVideo {
        SyntheticVideo::new(frame_count, |index| {
            if index < 1000 {
                solid([0, 0, 0], index)
            } else if index < 1100 {
                let v = (255 * (index - 1000) / 100) as u8;
                solid([v, v, v], index)
            } else {
                let marker = (index - 1100) % 150 < 40;
                sheet_frame(marker, index)
            }
        })
    }

    #[test]
    fn test_end_to_end_scenario() {
        let scanner = SheetScanner::new(ScanConfig {
            start_index: 1000,
            ..Default::default()
        });
        let mut video = lesson_video(2000);

        let outcome = scanner.scan(&mut video).unwrap();

        // first probe past pure black at stride 20
        assert_eq!(outcome.start_frame, 1020);
        // the fade produces the difference spike one probe later,
        // plus the 40-frame lookahead
        assert_eq!(outcome.hand_frame, 1080);

        // line 1 plus the five marker events past the cooldown
        // (1250, 1400, 1550, 1700, 1850 before the video ends)
        assert_eq!(outcome.sheet_frames.len(), 6);
        assert_eq!(outcome.sheet_frames.last(), Some(1860));

        // strictly increasing, adjacent gaps beyond the cooldown
        let frames = outcome.sheet_frames.as_slice();
        for pair in frames.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] - pair[0] > scanner.config().detector.cooldown);
        }
    }

    #[test]
    fn test_manual_line_count_caps_selection() {
        for count in 1..=4 {
            let scanner = SheetScanner::new(ScanConfig {
                start_index: 1000,
                line_count: Some(count),
                ..Default::default()
            });
            let mut video = lesson_video(2000);
            let outcome = scanner.scan(&mut video).unwrap();
            assert_eq!(outcome.sheet_frames.len(), count);
        }
    }

    #[test]
    fn test_export_never_exceeds_target_count() {
        use crate::scanner::selection::{select_lines, LineFilter};
        use std::collections::BTreeSet;

        let scanner = SheetScanner::new(ScanConfig {
            start_index: 1000,
            line_count: Some(3),
            filter: LineFilter {
                omit: BTreeSet::from([2]),
                ..Default::default()
            },
            ..Default::default()
        });
        let mut video = lesson_video(2000);
        let outcome = scanner.scan(&mut video).unwrap();
        assert_eq!(outcome.sheet_frames.len(), 3);

        // omission can only shrink the exported selection
        let lines = select_lines(&outcome.sheet_frames, &scanner.config().filter);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_all_black_video_fails_start() {
        let scanner = SheetScanner::new(ScanConfig {
            start_index: 0,
            ..Default::default()
        });
        let mut video = SyntheticVideo::new(500, |index| solid([0, 0, 0], index));

        let err = scanner.scan(&mut video).unwrap_err();
        assert!(matches!(err, ScanError::StartNotFound));
    }

    #[test]
    fn test_static_video_fails_hand_clear() {
        // overlay visible from frame 0 but nothing ever changes, so the
        // difference never reaches the threshold within the window
        let scanner = SheetScanner::new(ScanConfig {
            start_index: 0,
            ..Default::default()
        });
        let mut video = SyntheticVideo::new(5000, |index| solid([180, 180, 180], index));

        let err = scanner.scan(&mut video).unwrap_err();
        assert!(matches!(
            err,
            ScanError::HandClearNotFound { start: 0, window: 1000 }
        ));
    }

    #[test]
    fn test_stream_end_during_hand_search_fails() {
        // video ends right after the overlay appears
        let scanner = SheetScanner::new(ScanConfig {
            start_index: 0,
            ..Default::default()
        });
        let mut video = SyntheticVideo::new(30, |index| solid([180, 180, 180], index));

        let err = scanner.scan(&mut video).unwrap_err();
        assert!(matches!(err, ScanError::HandClearNotFound { .. }));
    }

    #[test]
    fn test_tab_top_orientation() {
        // same scenario, overlay semantics flipped: uniform synthetic
        // frames make both orientations equivalent, marker bar goes top
        let scanner = SheetScanner::new(ScanConfig {
            start_index: 1000,
            orientation: Orientation::TabTop,
            ..Default::default()
        });
        let mut video = SyntheticVideo::new(2000, |index| {
            if index < 1000 {
                solid([0, 0, 0], index)
            } else if index < 1100 {
                let v = (255 * (index - 1000) / 100) as u8;
                solid([v, v, v], index)
            } else {
                let mut frame = solid([180, 180, 180], index);
                if (index - 1100) % 150 < 40 {
                    let bar_rows = (HEIGHT as f32 * 0.35) as u32;
                    let bar_cols = (WIDTH as f32 * 0.20) as u32;
                    for row in 0..bar_rows {
                        for col in 0..bar_cols {
                            let idx = ((row * WIDTH + col) * 3) as usize;
                            frame.data[idx..idx + 3].copy_from_slice(&[255, 80, 40]);
                        }
                    }
                }
                frame
            }
        });

        let outcome = scanner.scan(&mut video).unwrap();
        assert_eq!(outcome.sheet_frames.len(), 6);
    }

    #[test]
    fn test_probe_sequence() {
        let probes: Vec<u64> = Probes::new(1000, 20).take(4).collect();
        assert_eq!(probes, vec![1000, 1020, 1040, 1060]);
    }
}
