use image_policy_core::error::{CoreError, CoreResult};
use image_policy_core::eval::config::RunnerConfig;
use image_policy_core::eval::registry::registry;
use image_policy_core::eval::runner::{GateRunner, TriggerInvocation};
use image_policy_core::image::snapshot::ImageSnapshot;
use image_policy_core::report::EvaluationReport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const USAGE: &str = "usage: gate_runner --list-gates\n       \
     gate_runner [--violations-csv <dir>] <image_snapshot.json|snapshot_dir> <invocations.json> [runner_config.json]";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().collect();
    if args.len() == 2 && args[1] == "--list-gates" {
        match serde_json::to_string_pretty(&registry()) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("registry error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }
    let csv_dir = match take_flag_value(&mut args, "--violations-csv") {
        Ok(dir) => dir.map(PathBuf::from),
        Err(()) => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };
    if args.len() < 3 || args.len() > 4 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    match run(
        Path::new(&args[1]),
        Path::new(&args[2]),
        args.get(3).map(Path::new),
        csv_dir.as_deref(),
    ) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("gate_runner error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Removes `--flag <value>` from `args`. A flag without a value is a usage error.
fn take_flag_value(args: &mut Vec<String>, flag: &str) -> Result<Option<String>, ()> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    if i + 1 >= args.len() {
        return Err(());
    }
    let value = args.remove(i + 1);
    args.remove(i);
    Ok(Some(value))
}

/// Evaluates every snapshot and prints one report per line. With `csv_dir`,
/// each report's violations are also written to `<evaluation_id>.csv` there.
/// Returns whether all invocations passed on all images.
fn run(
    target: &Path,
    invocations_path: &Path,
    config_path: Option<&Path>,
    csv_dir: Option<&Path>,
) -> CoreResult<bool> {
    let config = match config_path {
        Some(p) => RunnerConfig::from_json_file(p)?,
        None => RunnerConfig::default(),
    };
    let invocations = load_invocations(invocations_path)?;
    let runner = GateRunner::new(config)?;

    let paths = snapshot_paths(target)?;
    if paths.is_empty() {
        return Err(CoreError::InvalidInput(format!(
            "no image snapshots found under {}",
            target.display()
        )));
    }

    if let Some(dir) = csv_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut all_passed = true;
    for path in paths {
        let snapshot = ImageSnapshot::from_json_file(&path)?;
        let image_id = snapshot.image_id.clone();
        tracing::debug!(path = %path.display(), image_id = %image_id, "evaluating snapshot");
        let results = runner.run(Arc::new(snapshot), &invocations);
        let report = EvaluationReport::new(&image_id, results)?;
        all_passed &= report.passed();
        if let Some(dir) = csv_dir {
            let csv_path = dir.join(format!("{}.csv", report.evaluation_id));
            std::fs::write(&csv_path, report.violations_csv()?)?;
        }
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(all_passed)
}

fn load_invocations(path: &Path) -> CoreResult<Vec<TriggerInvocation>> {
    let body = std::fs::read_to_string(path)?;
    let invocations: Vec<TriggerInvocation> = serde_json::from_str(&body)?;
    if invocations.is_empty() {
        return Err(CoreError::InvalidInput(format!(
            "{} lists no trigger invocations",
            path.display()
        )));
    }
    Ok(invocations)
}

/// A single file, or every `*.json` below a directory in path order.
fn snapshot_paths(target: &Path) -> CoreResult<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(target).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::InvalidInput(e.to_string()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|x| x.to_str()) == Some("json")
        {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}
