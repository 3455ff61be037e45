// ============================================================================
// main.rs - driftfield
// Entry point. Initializes logging, reads options and starts the event loop
// (or the headless runner).
// ============================================================================

use std::path::PathBuf;

use driftfield::app::App;
use driftfield::headless::{run_headless, HeadlessConfig};
use driftfield::{FieldConfig, FieldError};
use winit::event_loop::{ControlFlow, EventLoop};

const USAGE: &str = "usage: driftfield [--config PATH] [--headless FRAMES]";

#[derive(Debug, Default)]
struct Options {
    config_path: Option<PathBuf>,
    headless_frames: Option<u32>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--headless" => {
                let frames = args.next().ok_or("--headless needs a frame count")?;
                let frames = frames
                    .parse()
                    .map_err(|_| format!("invalid frame count '{}'", frames))?;
                options.headless_frames = Some(frames);
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(options)
}

fn run(options: Options) -> Result<(), FieldError> {
    let config = match &options.config_path {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::default(),
    };

    if let Some(frames) = options.headless_frames {
        run_headless(
            &config,
            &HeadlessConfig {
                frames,
                ..Default::default()
            },
        )?;
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    // Frames are driven by redraw requests, not by polling.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() {
    env_logger::init();

    let options = match parse_options(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(options) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_all_flags() {
        let options = parse_options(args(&["--config", "field.json", "--headless", "90"])).unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("field.json")));
        assert_eq!(options.headless_frames, Some(90));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_options(args(&["--headless", "many"])).is_err());
        assert!(parse_options(args(&["--config"])).is_err());
        assert!(parse_options(args(&["--fullscreen"])).is_err());
    }
}
