#![forbid(unsafe_code)]

//! Headless driver for the ICL guided tour.

mod cli;
mod console;

use std::io::BufRead;
use std::time::Duration;

use icl_tour::onboarding::{OnboardingWalkthrough, default_onboarding_steps};
use icl_tour::seen_flag::{FileSeenFlag, SeenFlag};
use icl_tour::{TourConfig, TourResult, TourSequencer, catalog};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::Opts;
use crate::console::ConsoleHost;

const APP_NAME: &str = "icl-tour-demo";

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(opts: &Opts) -> TourResult<TourConfig> {
    let mut config = match &opts.config {
        Some(path) => TourConfig::load(path)?,
        None => TourConfig::default(),
    };
    config.apply_env();
    if let Some(speed) = opts.speed {
        config.speed = speed;
    }
    config.validate()?;
    Ok(config)
}

fn seen_flag(opts: &Opts) -> FileSeenFlag {
    match &opts.state_file {
        Some(path) => FileSeenFlag::new(path),
        None => FileSeenFlag::default_for_app(APP_NAME),
    }
}

fn wait_for_enter() {
    println!("Press Enter to start the tour.");
    let mut line = String::new();
    if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
        warn!(error = %e, "could not read stdin, starting anyway");
    }
}

fn run(opts: &Opts) -> TourResult<()> {
    let flag = seen_flag(opts);
    if opts.reset_onboarding {
        OnboardingWalkthrough::reset(&flag)?;
        println!("Onboarding will be shown on next launch ({}).", flag.path().display());
        return Ok(());
    }

    let config = load_config(opts)?;
    let steps = match &opts.steps {
        Some(path) => catalog::load_steps(path)?,
        None => catalog::icl_guide(),
    };

    if !opts.skip_onboarding {
        let mut walkthrough = OnboardingWalkthrough::new(default_onboarding_steps())?;
        if walkthrough.open_if_first_run(&flag) {
            console::print_onboarding(&mut walkthrough);
            if let Err(e) = walkthrough.finish(&flag) {
                warn!(backend = flag.name(), error = %e, "could not remember onboarding");
            }
        }
    }

    let mut tour = TourSequencer::with_config(steps, ConsoleHost::default(), &config)?;
    if !config.autoplay {
        wait_for_enter();
    }
    let exit_after = (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms));
    console::run_tour(&mut tour, config.max_overlay_steps, exit_after);
    Ok(())
}

fn main() {
    let opts = Opts::parse();
    init_logging(opts.log_json);

    if let Err(e) = run(&opts) {
        eprintln!("icl-tour-demo: {e}");
        std::process::exit(1);
    }
}
