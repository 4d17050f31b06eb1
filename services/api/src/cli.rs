use crate::demo::{run_demo, run_top_preview, DemoArgs, TopPreviewArgs};
use crate::server;
use bazaar::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Bazaar Marketplace Core",
    about = "Run and demonstrate the marketplace engagement and promotion service",
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
    /// Inspect the promotion subsystem from the command line
    Top {
        #[command(subcommand)]
        command: TopCommand,
    },
    /// Run an end-to-end CLI demo covering engagement and promotion
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TopCommand {
    /// Rank the seeded demo catalog and print both ranking modes
    Preview(TopPreviewArgs),
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
        Command::Top {
            command: TopCommand::Preview(args),
        } => run_top_preview(args),
        Command::Demo(args) => run_demo(args),
    }
}
