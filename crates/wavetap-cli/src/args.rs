//! Command line arguments.
//!
//! ```text
//! wavetap [--config <file.json>] [--output <dir>] [--no-arm] [<port>]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use wavetap_core::CaptureConfig;

pub const USAGE: &str = "\
Usage: wavetap [OPTIONS] [PORT]

Arguments:
  [PORT]                 Serial device, e.g. /dev/ttyACM0 or COM5

Options:
  -c, --config <FILE>    Load settings from a JSON file
  -o, --output <DIR>     Directory for capture files
      --no-arm           Do not send menu commands on start
  -h, --help             Print this help";

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub port: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub no_arm: bool,
    pub help: bool,
}

impl Args {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--no-arm" => parsed.no_arm = true,
                "-c" | "--config" => {
                    let value = args.next().context("--config requires a file")?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "-o" | "--output" => {
                    let value = args.next().context("--output requires a directory")?;
                    parsed.output_dir = Some(PathBuf::from(value));
                }
                flag if flag.starts_with('-') => bail!("Unknown option: {flag}"),
                port => {
                    if parsed.port.is_some() {
                        bail!("Unexpected argument: {port}");
                    }
                    parsed.port = Some(port.to_string());
                }
            }
        }

        Ok(parsed)
    }

    /// Build the capture configuration: file (or defaults), then overrides.
    pub fn capture_config(&self) -> Result<CaptureConfig> {
        let mut config = match &self.config {
            Some(path) => CaptureConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CaptureConfig::default(),
        };

        if let Some(port) = &self.port {
            config.port = port.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_arm {
            config.arm_device = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_parse_all_options() {
        let args = parse(&["-c", "capture.json", "--output", "out", "--no-arm", "COM5"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("capture.json")));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.port.as_deref(), Some("COM5"));
        assert!(args.no_arm);
    }

    #[rstest]
    #[case::missing_config_value(&["--config"])]
    #[case::missing_output_value(&["-o"])]
    #[case::unknown_flag(&["--fast"])]
    #[case::two_ports(&["COM5", "COM6"])]
    fn test_parse_rejects(#[case] args: &[&str]) {
        assert!(parse(args).is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let args = parse(&["--no-arm", "-o", "captures", "/dev/ttyACM1"]).unwrap();
        let config = args.capture_config().unwrap();

        assert_eq!(config.port, "/dev/ttyACM1");
        assert_eq!(config.output_dir, PathBuf::from("captures"));
        assert!(!config.arm_device);
        assert_eq!(config.baud_rate, 3_686_400);
    }

    #[test]
    fn test_missing_config_file() {
        let args = parse(&["--config", "/nonexistent/wavetap.json"]).unwrap();
        let err = args.capture_config().unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
