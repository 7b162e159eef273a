use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use polcmp_flatten::ShapeSelection;
use polcmp_types::KeyAddressingMode;

#[derive(Parser)]
#[command(
    name = "polcmp",
    about = "Policy Compare: classify every setting of two policy exports as MATCH, DIFF or CONFLICT",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with flattening and comparison settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two policy exports setting by setting
    Compare(CompareArgs),
    /// Show the flattened settings of a single policy export
    Flatten(FlattenArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    /// Directory that receives a timestamped JSON report
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Only print DIFF and CONFLICT rows
    #[arg(long)]
    pub only_differences: bool,
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args)]
pub struct FlattenArgs {
    pub file: PathBuf,
    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Overrides for the flattening engine; unset flags keep the config value.
#[derive(Args, Clone, Debug, Default)]
pub struct EngineArgs {
    #[arg(long, value_enum)]
    pub addressing: Option<AddressingArg>,
    #[arg(long, value_enum)]
    pub shape: Option<ShapeArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AddressingArg {
    Full,
    LastSegment,
}

impl From<AddressingArg> for KeyAddressingMode {
    fn from(arg: AddressingArg) -> Self {
        match arg {
            AddressingArg::Full => Self::Full,
            AddressingArg::LastSegment => Self::LastSegment,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ShapeArg {
    Auto,
    SettingsDelta,
    Generic,
}

impl From<ShapeArg> for ShapeSelection {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::Auto => Self::Auto,
            ShapeArg::SettingsDelta => Self::SettingsDelta,
            ShapeArg::Generic => Self::Generic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compare() {
        let cli = Cli::try_parse_from(["polcmp", "compare", "a.json", "b.json"]).unwrap();
        if let Command::Compare(args) = cli.command {
            assert_eq!(args.left, PathBuf::from("a.json"));
            assert_eq!(args.right, PathBuf::from("b.json"));
            assert!(args.output_dir.is_none());
            assert!(args.engine.addressing.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_compare_with_output_dir() {
        let cli = Cli::try_parse_from(["polcmp", "compare", "a.json", "b.json", "-o", "out"]).unwrap();
        if let Command::Compare(args) = cli.command {
            assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_compare_requires_two_inputs() {
        assert!(Cli::try_parse_from(["polcmp", "compare", "a.json"]).is_err());
    }

    #[test]
    fn parse_engine_overrides() {
        let cli = Cli::try_parse_from([
            "polcmp", "compare", "a.json", "b.json",
            "--addressing", "full", "--shape", "settings-delta", "--only-differences",
        ]).unwrap();
        if let Command::Compare(args) = cli.command {
            assert_eq!(args.engine.addressing, Some(AddressingArg::Full));
            assert_eq!(args.engine.shape, Some(ShapeArg::SettingsDelta));
            assert!(args.only_differences);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_flatten() {
        let cli = Cli::try_parse_from(["polcmp", "flatten", "p.json", "--addressing", "last-segment"]).unwrap();
        if let Command::Flatten(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("p.json"));
            assert_eq!(args.engine.addressing, Some(AddressingArg::LastSegment));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "polcmp", "--verbose", "--format", "json", "--config", "polcmp.toml", "flatten", "p.json",
        ]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("polcmp.toml")));
    }

    #[test]
    fn arg_conversions() {
        assert_eq!(KeyAddressingMode::from(AddressingArg::Full), KeyAddressingMode::Full);
        assert_eq!(ShapeSelection::from(ShapeArg::Generic), ShapeSelection::Generic);
    }
}
