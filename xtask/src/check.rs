use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Bare-metal target used to prove the driver crates stay `no_std`.
const NO_STD_TARGET: &str = "thumbv7em-none-eabihf";

/// What a failing step does to the overall check.
#[derive(Clone, Copy, PartialEq, Eq)]
enum OnFailure {
    Abort,
    Warn,
}

struct Step {
    label: &'static str,
    args: &'static [&'static str],
    on_failure: OnFailure,
}

const STEPS: &[Step] = &[
    Step {
        label: "platform crate (no_std)",
        args: &["check", "-p", "platform", "--target", NO_STD_TARGET, "--no-default-features"],
        on_failure: OnFailure::Abort,
    },
    Step {
        label: "sevenseg crate (no_std)",
        args: &["check", "-p", "sevenseg", "--target", NO_STD_TARGET, "--no-default-features"],
        on_failure: OnFailure::Abort,
    },
    Step {
        label: "host build with mocks",
        args: &["check", "--workspace", "--all-targets", "--features", "platform/std"],
        on_failure: OnFailure::Abort,
    },
    Step {
        label: "clippy lints",
        args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        on_failure: OnFailure::Warn,
    },
    Step {
        label: "code formatting",
        args: &["fmt", "--all", "--check"],
        on_failure: OnFailure::Warn,
    },
];

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking driver crates...".cyan().bold());
    println!();

    let total_start = Instant::now();
    let mut warnings = 0usize;

    for step in STEPS {
        println!("{}", format!("  Checking {}...", step.label).cyan());
        let start = Instant::now();

        let output = Command::new("cargo")
            .args(step.args)
            .output()
            .with_context(|| format!("Failed to run cargo for {}", step.label))?;

        if output.status.success() {
            println!(
                "{}",
                format!(
                    "  ✓ {} passed in {:.2}s",
                    step.label,
                    start.elapsed().as_secs_f64()
                )
                .green()
            );
        } else {
            match step.on_failure {
                OnFailure::Abort => {
                    eprintln!("{}", format!("  ✗ {} failed", step.label).red().bold());
                    eprintln!();
                    eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                    anyhow::bail!("{} failed", step.label);
                }
                OnFailure::Warn => {
                    warnings = warnings.saturating_add(1);
                    eprintln!("{}", format!("  ⚠ {} reported issues", step.label).yellow().bold());
                    eprintln!();
                    eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                    if step.args.first() == Some(&"fmt") {
                        eprintln!("     Run 'cargo fmt --all' to fix");
                    }
                }
            }
        }
        println!();
    }

    let elapsed = total_start.elapsed().as_secs_f64();
    if warnings == 0 {
        println!("{}", format!("✓ All checks completed in {elapsed:.2}s").green().bold());
    } else {
        println!(
            "{}",
            format!("⚠ Checks completed with {warnings} warning step(s) in {elapsed:.2}s")
                .yellow()
                .bold()
        );
    }
    println!();

    Ok(())
}
