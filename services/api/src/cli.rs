use crate::demo::{run_demo, run_stats, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use placement_core::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Campus Placement Portal",
    about = "Run and demonstrate the campus placement portal from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a scripted placement drive through the exclusivity engine
    Demo(DemoArgs),
    /// Print the officer dashboard for a scripted placement drive
    Stats,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Stats => run_stats(),
    }
}
