use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use polcmp_compare::compare;
use polcmp_flatten::{FlattenedPolicy, Flattener};

use crate::cli::*;
use crate::config::CompareConfig;
use crate::output;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CompareConfig::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Command::Compare(args) => cmd_compare(args, config, cli.format),
        Command::Flatten(args) => cmd_flatten(args, config, cli.format),
    }
}

fn cmd_compare(args: CompareArgs, config: CompareConfig, format: OutputFormat) -> anyhow::Result<()> {
    let config = config.with_overrides(&args.engine);
    let text = matches!(format, OutputFormat::Text);

    if text {
        println!("Input File 1: {}", args.left.display());
        println!("Input File 2: {}", args.right.display());
        if let Some(dir) = &args.output_dir {
            println!("Output Directory: {}", dir.display());
        }
    }

    if !args.left.is_file() || !args.right.is_file() {
        bail!("One or both input files do not exist.");
    }

    let flattener = Flattener::new(config.flatten_config());
    let left = load_policy(&flattener, &args.left)?;
    let right = load_policy(&flattener, &args.right)?;
    let report = compare(&left, &right, &config.compare_options());

    match format {
        OutputFormat::Text => print!("\n{}", output::render_table(&report, args.only_differences)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(dir) = &args.output_dir {
        let path = output::write_report(&report, dir, chrono::Local::now())?;
        if text {
            println!("{} Complete: {}", "✓".green().bold(), path.display());
        }
    }
    Ok(())
}

fn cmd_flatten(args: FlattenArgs, config: CompareConfig, format: OutputFormat) -> anyhow::Result<()> {
    let config = config.with_overrides(&args.engine);
    if !args.file.is_file() {
        bail!("Input file does not exist: {}", args.file.display());
    }

    let policy = load_policy(&Flattener::new(config.flatten_config()), &args.file)?;
    match format {
        OutputFormat::Text => {
            println!(
                "{} ({} shape, {} keys)",
                policy.display_name.as_deref().unwrap_or("<unnamed>").bold(),
                policy.shape.to_string().cyan(),
                policy.entries.len(),
            );
            for (key, value) in policy.entries.iter() {
                println!("  {} = {}", key.yellow(), value);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&policy.entries)?),
    }
    Ok(())
}

fn load_policy(flattener: &Flattener, path: &Path) -> anyhow::Result<FlattenedPolicy> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let policy = flattener
        .flatten_str(&json)
        .with_context(|| format!("flattening {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        shape = %policy.shape,
        keys = policy.entries.len(),
        "loaded policy"
    );
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    fn write_policy(dir: &Path, name: &str, value: &str) -> std::path::PathBuf {
        let path = dir.join(format!("{name}.json"));
        let doc = json!({
            "displayName": name,
            "TemplateId": "baseline",
            "settingsDelta": [
                {
                    "@odata.type": "#microsoft.graph.deviceManagementSimpleSettingInstance",
                    "definitionId": "vendor_defender_scan",
                    "value": value
                }
            ]
        });
        fs::write(&path, doc.to_string()).unwrap();
        path
    }

    fn run(args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["polcmp"];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn compare_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_policy(dir.path(), "left", "on");
        let right = write_policy(dir.path(), "right", "off");
        let out = dir.path().join("out");

        run(&[
            "--format", "json", "compare",
            left.to_str().unwrap(), right.to_str().unwrap(),
            "-o", out.to_str().unwrap(),
        ])
        .unwrap();

        let written: Vec<_> = fs::read_dir(&out).unwrap().collect();
        assert_eq!(written.len(), 1);
        let path = written[0].as_ref().unwrap().path();
        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        let scan = report["rows"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["key"] == "scan")
            .unwrap();
        assert_eq!(scan["outcome"], "CONFLICT");
    }

    #[test]
    fn compare_rejects_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_policy(dir.path(), "left", "on");
        let absent = dir.path().join("absent.json");

        let err = run(&["compare", left.to_str().unwrap(), absent.to_str().unwrap()]).unwrap_err();
        assert_eq!(err.to_string(), "One or both input files do not exist.");
    }

    #[test]
    fn compare_reports_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_policy(dir.path(), "left", "on");
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ \"TemplateId\": ").unwrap();

        let err = run(&["compare", left.to_str().unwrap(), broken.to_str().unwrap()]).unwrap_err();
        assert!(err.to_string().starts_with("flattening"), "{err}");
    }

    #[test]
    fn flatten_uses_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let policy = write_policy(dir.path(), "policy", "on");
        let config = dir.path().join("polcmp.toml");
        fs::write(&config, "addressing = \"full\"\n").unwrap();

        run(&["--config", config.to_str().unwrap(), "flatten", policy.to_str().unwrap()]).unwrap();

        let loaded = CompareConfig::load_or_default(Some(config.as_path())).unwrap();
        let flattened = load_policy(&Flattener::new(loaded.flatten_config()), &policy).unwrap();
        assert_eq!(
            flattened.entries.get("vendor_defender_scan"),
            Some(&polcmp_types::FlatValue::text("on"))
        );
        assert!(!flattened.entries.contains_key("scan"));
    }

    #[test]
    fn default_config_keys_by_last_segment() {
        let dir = tempfile::tempdir().unwrap();
        let policy = write_policy(dir.path(), "policy", "on");

        let config = CompareConfig::load_or_default(None).unwrap();
        let flattened = load_policy(&Flattener::new(config.flatten_config()), &policy).unwrap();
        assert!(flattened.entries.contains_key("scan"));
        assert!(!flattened.entries.contains_key("vendor_defender_scan"));
    }

    #[test]
    fn bad_config_fails_before_reading_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("polcmp.toml");
        fs::write(&config, "max_depth = \"deep\"\n").unwrap();

        let err = run(&["--config", config.to_str().unwrap(), "flatten", "nowhere.json"]).unwrap_err();
        assert!(err.to_string().contains("parsing config"), "{err}");
    }
}
