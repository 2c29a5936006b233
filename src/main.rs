use std::process::ExitCode;

use greenbank::app::{self, App};
use greenbank::terminal::{CrosstermBackend, HeadlessBackend};
use greenbank::{Config, Controller};

fn run(config: &Config) -> greenbank::Result<()> {
    app::init_logging(config)?;
    let tables = app::load_tables(config)?;
    let controller = Controller::new(Box::new(tables));

    if config.headless {
        App::new(controller, HeadlessBackend::new(80, 24), config).run()
    } else {
        App::new(controller, CrosstermBackend::new(), config).run()
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("greenbank: {e}");
            ExitCode::FAILURE
        }
    }
}
