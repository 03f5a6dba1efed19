//! Generate SERVICEOWNERS fixtures for benchmarking.
//!
//! Usage: cargo run --release --bin generate-fixtures --features generate -- [output_dir]
//!
//! Each preset produces a rule file and a list of changed paths that can be
//! piped into `sowners impacted --stdin`.

use serviceowners_core::generate::{GeneratorConfig, generate, generate_paths};
use std::{fs, io, path::Path, path::PathBuf, process::ExitCode};

/// Type alias for fixture preset entries.
type PresetEntry = (&'static str, fn() -> GeneratorConfig);

/// Fixture presets, matching the serviceowners-core bench fixtures.
const PRESETS: &[PresetEntry] = &[
    ("small", GeneratorConfig::small),
    ("medium", GeneratorConfig::medium),
    ("large", GeneratorConfig::large),
];

fn main() -> ExitCode {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("benches/fixtures"));

    if let Err(e) = run(&output_dir) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    for (name, config_fn) in PRESETS {
        let config = config_fn();

        let rules = generate(&config);
        let rules_path = output_dir.join(format!("{name}.serviceowners"));
        fs::write(&rules_path, &rules)?;

        let mut paths = generate_paths(&config).join("\n");
        paths.push('\n');
        let paths_path = output_dir.join(format!("{name}.paths"));
        fs::write(&paths_path, &paths)?;

        println!(
            "Generated {} ({} bytes, {} rules) and {} ({} paths)",
            rules_path.display(),
            rules.len(),
            config.num_rules,
            paths_path.display(),
            config.num_paths
        );
    }

    Ok(())
}
