use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Parser;

use tabsheet::scanner::{DetectorConfig, LineFilter, Orientation, ScanConfig};

#[derive(Debug, Parser)]
#[command(
    name = "tabsheet",
    about = "Extract tablature sheet lines from a lesson video into one image",
    disable_help_subcommand = true
)]
pub struct Args {
    /// Video URL or local file path to scrape tabs from
    #[arg(short = 'l', long = "link")]
    pub link: Option<String>,

    /// Directory of pre-extracted frames ({index:06}.png), instead of a video
    #[arg(long = "frames-dir", conflicts_with = "link")]
    pub frames_dir: Option<PathBuf>,

    /// How many sheet lines to take (manual override of auto termination)
    #[arg(short = 'c', long = "count")]
    pub count: Option<usize>,

    /// Tabs render in the upper portion of the frame instead of the bottom
    #[arg(long = "tab-up")]
    pub tab_up: bool,

    /// Frame index where scanning starts
    #[arg(long = "start-frame", default_value_t = 1000)]
    pub start_frame: u64,

    /// 1-based line numbers to drop from the output
    #[arg(long = "omit", value_delimiter = ',')]
    pub omit: Vec<usize>,

    /// First line number to keep (inclusive)
    #[arg(long = "from-line")]
    pub from_line: Option<usize>,

    /// Last line number to keep (inclusive)
    #[arg(long = "to-line")]
    pub to_line: Option<usize>,

    /// Output image path (defaults to the video name with a .png extension)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Directory downloaded videos are kept in
    #[arg(long = "video-dir", default_value = "videos")]
    pub video_dir: PathBuf,
}

impl Args {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            start_index: self.start_frame,
            orientation: if self.tab_up {
                Orientation::TabTop
            } else {
                Orientation::TabBottom
            },
            line_count: self.count,
            filter: LineFilter {
                omit: BTreeSet::from_iter(self.omit.iter().copied()),
                first_line: self.from_line,
                last_line: self.to_line,
            },
            detector: DetectorConfig::default(),
        }
    }
}
