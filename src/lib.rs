//! tabsheet - pulls the tablature sheet out of a fingerstyle lesson video
//! and stitches its lines into a single image.
//!
//! The interesting part lives in [`scanner`]: pixel-level detectors over a
//! three-phase scan of the video. [`source`] and [`readers`] supply the
//! video file and random-access frame decoding around it.

pub mod readers;
pub mod scanner;
pub mod source;

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
