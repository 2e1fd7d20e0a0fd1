use clap::Parser;
use miette::Result;
use qcspc::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log to stderr so command output on stdout stays pipeable
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("qcspc={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = &cli.global;
    match cli.command {
        Commands::Stats(args) => qcspc::cli::commands::stats::run(args, global),
        Commands::Mr(args) => qcspc::cli::commands::mr::run(args, global),
        Commands::Cap(args) => qcspc::cli::commands::cap::run(args, global),
        Commands::Report(args) => qcspc::cli::commands::report::run(args, global),
        Commands::Std(cmd) => qcspc::cli::commands::standards::run(cmd, global),
        Commands::Items(args) => qcspc::cli::commands::items::run(args, global),
        Commands::Completions(args) => qcspc::cli::commands::completions::run(args),
    }
}
