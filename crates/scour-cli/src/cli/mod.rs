pub mod args;
mod report;

use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use scour_core::clean::{self, CleanOptions};
use scour_core::config::Config;
use scour_core::detect;

use self::args::Cli;

pub fn run(cli: Cli) -> color_eyre::Result<()> {
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let rules = config.rules()?;
    tracing::debug!(
        preserve = ?config.preserved_patterns().collect::<Vec<_>>(),
        protected_dir = rules.protected_dir(),
        "effective rules"
    );

    let root = match &cli.root {
        Some(root) => resolve_root(root),
        None => detect::find_project_root(&std::env::current_dir()?, rules.marker()),
    };
    tracing::debug!(root = %root.display(), dry_run = cli.dry_run, all = cli.all, "starting");

    let options = CleanOptions {
        include_protected: cli.all,
    };

    if cli.json {
        let plan = clean::plan_clean(&root, &rules, options);
        let outcome = clean::execute_clean(&plan, cli.dry_run, |_| {});
        report::print_json(&plan, &outcome, cli.dry_run, cli.all)?;
        return Ok(());
    }

    println!("Cleaning project: {}", root.display());
    println!();
    if cli.all {
        println!(
            "Warning: --all flag set: {} will also be removed!",
            rules.protected_dir()
        );
        println!();
    }

    let plan = clean::plan_clean(&root, &rules, options);
    if plan.is_empty() {
        println!("Already clean! Nothing to remove.");
        return Ok(());
    }

    let mut printer = report::Printer::default();
    let outcome = clean::execute_clean(&plan, cli.dry_run, |event| printer.event(event));
    printer.finish(&outcome, cli.dry_run);

    Ok(())
}

/// Use an explicit root as given, made absolute when possible.
fn resolve_root(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|e| {
        tracing::warn!(root = %root.display(), error = %e, "could not resolve root");
        root.to_path_buf()
    })
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
