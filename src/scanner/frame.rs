/// Which part of the frame carries the tablature overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Overlay in the lower portion of the frame (the common case).
    TabBottom,
    /// Overlay in the upper portion (some lesson channels render it there).
    TabTop,
}

/// A decoded video frame.
///
/// Pixels are packed 3 bytes each in the decoder-native BGR channel order.
/// Frames are read-only once obtained; cropping and channel reordering
/// always produce a new `Frame`.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// Index of this frame in the source video.
    pub index: u64,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>, index: u64) -> Self {
        debug_assert_eq!(data.len(), (width * height * 3) as usize);
        Self {
            width,
            height,
            data,
            index,
        }
    }

    /// Build a frame from an RGB buffer, reordering into the BGR layout
    /// the rest of the pipeline expects from a decoder.
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>, index: u64) -> Self {
        let mut frame = Self::new(width, height, rgb, index);
        frame.swap_rb();
        frame
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn pixel(&self, row: u32, col: u32) -> [u8; 3] {
        let idx = ((row * self.width + col) * 3) as usize;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Crop to the overlay-bearing portion: the bottom `fraction` of rows
    /// for `TabBottom`, the top `fraction` for `TabTop`.
    pub fn overlay_region(&self, orientation: Orientation, fraction: f32) -> Frame {
        let rows = (self.height as f32 * fraction) as u32;
        match orientation {
            Orientation::TabBottom => self.crop_rows(self.height - rows, self.height),
            Orientation::TabTop => self.crop_rows(0, rows),
        }
    }

    /// Crop to the leftmost `fraction` of columns.
    pub fn left_columns(&self, fraction: f32) -> Frame {
        let cols = (self.width as f32 * fraction) as u32;
        self.crop_cols(0, cols)
    }

    /// Crop to the rightmost `fraction` of columns.
    pub fn right_columns(&self, fraction: f32) -> Frame {
        let cols = (self.width as f32 * fraction) as u32;
        self.crop_cols(self.width - cols, self.width)
    }

    fn crop_rows(&self, start: u32, end: u32) -> Frame {
        let row_bytes = (self.width * 3) as usize;
        let data = self.data[start as usize * row_bytes..end as usize * row_bytes].to_vec();
        Frame::new(self.width, end - start, data, self.index)
    }

    fn crop_cols(&self, start: u32, end: u32) -> Frame {
        let width = end - start;
        let mut data = Vec::with_capacity((width * self.height * 3) as usize);
        for row in 0..self.height {
            let from = ((row * self.width + start) * 3) as usize;
            let to = ((row * self.width + end) * 3) as usize;
            data.extend_from_slice(&self.data[from..to]);
        }
        Frame::new(width, self.height, data, self.index)
    }

    /// Reorder channels into display-standard RGB.
    pub fn to_rgb(&self) -> Frame {
        let mut frame = self.clone();
        frame.swap_rb();
        frame
    }

    fn swap_rb(&mut self) {
        for px in self.data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
    }
}
