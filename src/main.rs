use clap::Parser;
use damcam::{Cli, DamCam, DamCamError, OutputFormatter, OutputMode, UserFriendlyError};
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let damcam = match DamCam::from_cli(&cli) {
        Ok(damcam) => damcam,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    if cli.dry_run {
        return handle_dry_run(&damcam);
    }

    match damcam.run() {
        Ok(summary) => {
            if summary.total_collisions() > 0 {
                2 // Finished, but some images were not copied
            } else {
                0
            }
        }
        Err(e) => {
            damcam.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "damcam.toml".to_string());

    match DamCam::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  damcam --config {}", config_path);
            println!("\nEdit the [site] section to match the deployment you are renaming.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            e.exit_code()
        }
    }
}

fn handle_dry_run(damcam: &DamCam) -> i32 {
    let formatter = damcam.output_formatter();
    let config = damcam.config();

    if formatter.mode() != OutputMode::Json {
        formatter.start_operation("DRY RUN MODE - No files will be copied");
        formatter.print_separator();
        formatter.detail(&format!("Input root:   {}", config.paths.input_root.display()));
        formatter.detail(&format!("Output root:  {}", config.paths.output_root.display()));
        formatter.detail(&format!("Reports:      {}", config.paths.report_dir.display()));
        formatter.detail(&format!(
            "Site:         {}_{}_{}*",
            config.site.study_area, config.site.place, config.site.download_prefix
        ));
        formatter.detail(&format!("Time delta:   {} hours", config.naming.time_delta_hours));
        formatter.detail(&format!("Seconds:      {}", config.naming.include_seconds));
        formatter.print_separator();
    }

    match damcam.plan() {
        Ok(reports) => {
            formatter.print_plan(&reports);
            let collisions: usize = reports.iter().map(|r| r.collisions()).sum();
            if collisions > 0 {
                formatter.warning(&format!(
                    "{} images would collide with an earlier name; consider --seconds",
                    collisions
                ));
                2
            } else {
                formatter.success("Dry run completed successfully");
                0
            }
        }
        Err(e) => {
            damcam.handle_error(&e);
            e.exit_code()
        }
    }
}

fn print_startup_error(error: &DamCamError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr so they never mix with the summary on stdout.
/// `RUST_LOG` takes precedence over `-v`.
fn setup_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "damcam=warn",
        1 => "damcam=debug",
        _ => "damcam=trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .ok();
}
