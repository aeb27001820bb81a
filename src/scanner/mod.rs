//! Sheet scanner - extracts tablature lines rendered over a lesson video.
//!
//! Core flow:
//! 1. FindStart - probe forward until the overlay region stops being black
//! 2. FindHandClear - frame differencing until the performer's hands move
//!    off the overlay
//! 3. FindLines - collect one frame per tab line via the blue marker bar,
//!    with a cooldown against duplicate detections
//!
//! The selected frames are filtered (omission set, line bounds) and
//! stacked vertically into a single composite image.

pub mod classifier;
pub mod compositor;
pub mod frame;
pub mod reader;
pub mod scan;
pub mod selection;

pub use classifier::DetectorConfig;
pub use compositor::{compose_sheet, ExportError};
pub use frame::{Frame, Orientation};
pub use reader::{FrameReader, SyntheticVideo};
pub use scan::{ScanConfig, ScanError, ScanOutcome, ScanPhase, SheetScanner};
pub use selection::{apply_filter, select_lines, LineFilter, SheetFrameList, SheetLine};
