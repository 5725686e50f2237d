//! `isle-bloom [SETTINGS.toml]`
//!
//! Opens the island demo. Settings are read from the given path (default
//! `resources/isle_bloom.toml`) and written back on exit.

use std::process::ExitCode;

use isle_bloom::options::DEFAULT_OPTIONS_PATH;
use isle_bloom::viewer::Viewer;

fn main() -> ExitCode {
    env_logger::init();

    let options_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OPTIONS_PATH.to_owned());

    match Viewer::builder().with_options_path(options_path).build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
