#![forbid(unsafe_code)]

//! Command-line argument parsing for the tour driver.
//!
//! Parses args by hand to keep the binary lean. Playback settings can also
//! come from a JSON config file and `ICL_TOUR_*` environment variables;
//! flags given here win over both.

use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
ICL Tour - headless guided tour of the ICL telemetry dashboard

USAGE:
    icl-tour-demo [OPTIONS]

OPTIONS:
    --speed=X             Playback speed multiplier (0.5, 1, 1.5, 2; default: 1)
    --steps=FILE          Load tour steps from a JSON file instead of the built-in guide
    --config=FILE         Load playback settings from a JSON file
    --state-file=FILE     Where the onboarding seen flag is stored
    --reset-onboarding    Forget that onboarding was seen, then exit
    --skip-onboarding     Do not show the onboarding walkthrough
    --exit-after-ms=N     Stop the tour after N milliseconds (0 = run to the end)
    --log-json            Emit logs as JSON on stderr
    --help, -h            Show this help message
    --version, -V         Show version

ENVIRONMENT VARIABLES:
    ICL_TOUR_SPEED              Override the playback speed
    ICL_TOUR_CLOSING_DELAY_MS   Delay between the last step and closing
    ICL_TOUR_AUTOPLAY           Start playing immediately (true|false)
    RUST_LOG                    Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Opts {
    pub speed: Option<f64>,
    pub steps: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub reset_onboarding: bool,
    pub skip_onboarding: bool,
    /// Stop the tour after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments, printing help/version or usage errors
    /// and exiting where appropriate.
    pub fn parse() -> Self {
        match parse_from(std::env::args().skip(1)) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                std::process::exit(0);
            }
            Ok(Command::Version) => {
                println!("icl-tour-demo {VERSION}");
                std::process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                std::process::exit(1);
            }
        }
    }
}

pub fn parse_from<I, S>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut opts = Opts::default();
    for arg in args {
        let arg = arg.as_ref();
        match arg {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--reset-onboarding" => opts.reset_onboarding = true,
            "--skip-onboarding" => opts.skip_onboarding = true,
            "--log-json" => opts.log_json = true,
            other => {
                if let Some(val) = other.strip_prefix("--speed=") {
                    match val.parse::<f64>() {
                        Ok(speed) if speed.is_finite() && speed > 0.0 => opts.speed = Some(speed),
                        _ => return Err(format!("Invalid --speed value: {val}")),
                    }
                } else if let Some(val) = other.strip_prefix("--steps=") {
                    opts.steps = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--config=") {
                    opts.config = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--state-file=") {
                    opts.state_file = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                    opts.exit_after_ms = val
                        .parse()
                        .map_err(|_| format!("Invalid --exit-after-ms value: {val}"))?;
                } else {
                    return Err(format!("Unknown argument: {other}"));
                }
            }
        }
    }
    Ok(Command::Run(opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_runs_with_defaults() {
        let cmd = parse_from(Vec::<String>::new()).expect("parse");
        assert_eq!(cmd, Command::Run(Opts::default()));
    }

    #[test]
    fn flags_are_collected() {
        let cmd = parse_from([
            "--speed=1.5",
            "--steps=tour.json",
            "--state-file=/tmp/flag.json",
            "--skip-onboarding",
            "--exit-after-ms=250",
            "--log-json",
        ])
        .expect("parse");
        let Command::Run(opts) = cmd else {
            panic!("expected run command");
        };
        assert_eq!(opts.speed, Some(1.5));
        assert_eq!(opts.steps, Some(PathBuf::from("tour.json")));
        assert_eq!(opts.state_file, Some(PathBuf::from("/tmp/flag.json")));
        assert!(opts.skip_onboarding);
        assert_eq!(opts.exit_after_ms, 250);
        assert!(opts.log_json);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse_from(["--speed=2", "-h"]), Ok(Command::Help));
        assert_eq!(parse_from(["--version"]), Ok(Command::Version));
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(parse_from(["--speed=0"]).unwrap_err().contains("--speed"));
        assert!(parse_from(["--speed=fast"]).is_err());
        assert!(parse_from(["--exit-after-ms=-1"]).is_err());
        assert!(parse_from(["--bogus"]).unwrap_err().contains("Unknown argument"));
    }

    #[test]
    fn help_text_lists_env_vars() {
        assert!(HELP_TEXT.contains("ICL_TOUR_SPEED"));
        assert!(HELP_TEXT.contains("ICL_TOUR_AUTOPLAY"));
        assert!(!VERSION.is_empty());
    }
}
