mod cli;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use tabsheet::readers::{FfmpegReader, ImageDirReader};
use tabsheet::scanner::{compose_sheet, select_lines, FrameReader, SheetScanner};
use tabsheet::source::{HttpVideoSource, VideoSource};

fn main() {
    tabsheet::init_logging();
    let args = cli::Args::parse();

    if let Err(err) = run(args) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: cli::Args) -> Result<(), Box<dyn Error>> {
    let scanner = SheetScanner::new(args.scan_config());

    if let Some(dir) = &args.frames_dir {
        let output = args.output.clone().unwrap_or_else(|| PathBuf::from("sheet.png"));
        let mut reader = ImageDirReader::open(dir)?;
        extract(&scanner, &mut reader, &output)
    } else {
        let link = args
            .link
            .as_deref()
            .ok_or("either --link or --frames-dir is required")?;
        let source = HttpVideoSource::new(&args.video_dir)?;
        let video_path = source.resolve(link)?;
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| video_path.with_extension("png"));
        let mut reader = FfmpegReader::open(&video_path)?;
        extract(&scanner, &mut reader, &output)
    }
}

fn extract<R: FrameReader>(
    scanner: &SheetScanner,
    reader: &mut R,
    output: &PathBuf,
) -> Result<(), Box<dyn Error>> {
    let outcome = scanner.scan(reader).inspect_err(|err| {
        error!("scan failed in {:?} phase", err.phase());
    })?;
    info!(
        "scan done: start frame {}, {} lines detected",
        outcome.start_frame,
        outcome.sheet_frames.len()
    );

    let config = scanner.config();
    let lines = select_lines(&outcome.sheet_frames, &config.filter);
    let sheet = compose_sheet(reader, &lines, config.orientation, config.detector.export_crop)?;
    sheet.save(output)?;
    info!("wrote {} lines to {}", lines.len(), output.display());
    Ok(())
}
