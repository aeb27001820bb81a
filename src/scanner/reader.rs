use crate::scanner::frame::Frame;

/// Random-access frame supplier consumed by the scan controller.
///
/// `None` means the stream is exhausted at that index. A failed read is
/// treated as authoritative end-of-stream; implementations never retry.
pub trait FrameReader {
    fn read_frame(&mut self, index: u64) -> Option<Frame>;
}

/// Closure-rendered video for tests: `render` produces the frame at any
/// index below `frame_count`.
pub struct SyntheticVideo {
    frame_count: u64,
    render: Box<dyn Fn(u64) -> Frame + Send + Sync>,
}

impl SyntheticVideo {
    pub fn new<F>(frame_count: u64, render: F) -> Self
    where
        F: Fn(u64) -> Frame + Send + Sync + 'static,
    {
        Self {
            frame_count,
            render: Box::new(render),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl FrameReader for SyntheticVideo {
    fn read_frame(&mut self, index: u64) -> Option<Frame> {
        (index < self.frame_count).then(|| (self.render)(index))
    }
}
