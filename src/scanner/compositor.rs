//! Assemble the retained lines into one composite sheet image.

use image::RgbImage;
use log::{info, warn};
use thiserror::Error;

use crate::scanner::frame::{Frame, Orientation};
use crate::scanner::reader::FrameReader;
use crate::scanner::selection::SheetLine;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no sheet lines left after filtering, nothing to concatenate")]
    EmptySelection,
    #[error("frame {index} is {width} pixels wide, sheet is {expected}")]
    MismatchedWidth { index: u64, width: u32, expected: u32 },
    #[error("assembled sheet buffer has inconsistent dimensions")]
    MalformedBuffer,
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Fetch every retained line, crop it to the export fraction of the
/// overlay region, reorder to RGB, and stack the strips vertically in
/// selection order.
///
/// A read failure mid-export truncates the sheet at the lines fetched so
/// far; an empty result is rejected rather than concatenated.
pub fn compose_sheet<R: FrameReader>(
    reader: &mut R,
    lines: &[SheetLine],
    orientation: Orientation,
    export_crop: f32,
) -> Result<RgbImage, ExportError> {
    let mut strips: Vec<Frame> = Vec::with_capacity(lines.len());
    for line in lines {
        let Some(frame) = reader.read_frame(line.frame_index) else {
            warn!(
                "frame {} for line {} unavailable, truncating sheet",
                line.frame_index, line.number
            );
            break;
        };
        strips.push(frame.overlay_region(orientation, export_crop).to_rgb());
    }

    if strips.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    info!("composing sheet from {} lines", strips.len());
    stack_vertical(&strips)
}

fn stack_vertical(strips: &[Frame]) -> Result<RgbImage, ExportError> {
    let width = strips[0].width;
    let height: u32 = strips.iter().map(|s| s.height).sum();

    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for strip in strips {
        if strip.width != width {
            return Err(ExportError::MismatchedWidth {
                index: strip.index,
                width: strip.width,
                expected: width,
            });
        }
        data.extend_from_slice(&strip.data);
    }

    RgbImage::from_raw(width, height, data).ok_or(ExportError::MalformedBuffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::reader::SyntheticVideo;

    fn solid(width: u32, height: u32, px: [u8; 3], index: u64) -> Frame {
        let data: Vec<u8> = px
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Frame::new(width, height, data, index)
    }

    fn line(number: usize, frame_index: u64) -> SheetLine {
        SheetLine { number, frame_index }
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let mut video = SyntheticVideo::new(100, |i| solid(10, 10, [0, 0, 0], i));
        let err = compose_sheet(&mut video, &[], Orientation::TabBottom, 0.45).unwrap_err();
        assert!(matches!(err, ExportError::EmptySelection));
    }

    #[test]
    fn test_strips_stack_in_order() {
        // encode the frame index into the blue channel (BGR order)
        let mut video = SyntheticVideo::new(100, |i| solid(10, 20, [i as u8, 0, 0], i));
        let lines = [line(1, 5), line(2, 40), line(3, 90)];

        let sheet = compose_sheet(&mut video, &lines, Orientation::TabBottom, 0.45).unwrap();

        // 20 * 0.45 = 9 rows per strip
        assert_eq!(sheet.width(), 10);
        assert_eq!(sheet.height(), 27);

        // strips appear top to bottom in selection order, converted to RGB
        assert_eq!(sheet.get_pixel(0, 0).0, [0, 0, 5]);
        assert_eq!(sheet.get_pixel(0, 9).0, [0, 0, 40]);
        assert_eq!(sheet.get_pixel(0, 18).0, [0, 0, 90]);
    }

    #[test]
    fn test_unreadable_frame_truncates() {
        let mut video = SyntheticVideo::new(50, |i| solid(10, 20, [7, 7, 7], i));
        let lines = [line(1, 5), line(2, 200), line(3, 40)];

        let sheet = compose_sheet(&mut video, &lines, Orientation::TabBottom, 0.45).unwrap();
        assert_eq!(sheet.height(), 9);
    }

    #[test]
    fn test_all_frames_unreadable_is_empty_selection() {
        let mut video = SyntheticVideo::new(10, |i| solid(10, 20, [0, 0, 0], i));
        let lines = [line(1, 100)];

        let err = compose_sheet(&mut video, &lines, Orientation::TabBottom, 0.45).unwrap_err();
        assert!(matches!(err, ExportError::EmptySelection));
    }
}
