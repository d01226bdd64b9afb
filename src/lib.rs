use bilicopy_core::fs_paths::{AppPaths, DesktopPaths};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConfigArgs};

pub mod cli;
pub mod commands;
pub mod core;
pub mod models;
pub mod platforms;
pub mod storage;

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,bilicopy_lib=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_config(args: &ConfigArgs, paths: &dyn AppPaths) -> anyhow::Result<()> {
    let settings = if args.init {
        commands::settings::init_settings(paths)?
    } else if args.reset {
        commands::settings::reset_settings(paths)?
    } else if let Some(patch) = &args.set {
        commands::settings::update_settings(paths, patch)?
    } else {
        commands::settings::get_settings(paths)
    };
    if args.writes() {
        eprintln!("{}", paths.settings_file().display());
    }
    if args.prints_settings() {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    }
    Ok(())
}

/// Entry point shared by the binary. Returns the process exit code.
pub fn run(cli: Cli) -> i32 {
    init_tracing(cli.verbose);
    let paths = DesktopPaths;

    if let Some(Command::Config(args)) = &cli.command {
        return match run_config(args, &paths) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{:#}", e);
                1
            }
        };
    }

    let mut settings = commands::settings::get_settings(&paths);
    cli.copy.apply_to(&mut settings);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {}", e);
            return 1;
        }
    };

    match runtime.block_on(commands::streams::copy_stream(&cli.copy, &settings)) {
        Ok(Some(url)) => {
            println!("{}", url);
            0
        }
        Ok(None) => 0,
        Err(e) => {
            eprintln!("{:#}", e);
            1
        }
    }
}
