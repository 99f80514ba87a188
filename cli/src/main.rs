mod commands;
mod terminal;

use commands::{CommandLine, Commands, explain, plan, scan, targets};
use deployr_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging();

    let cfg = Config {
        no_banner: commands.no_banner,
        quiet: commands.quiet,
    };
    print::banner(cfg.no_banner, cfg.quiet);

    match commands.command {
        Commands::Targets { values } => targets::targets(&values, &cfg),
        Commands::Scan(args) => scan::scan(args, &cfg).await,
        Commands::Plan(args) => plan::plan(args, &cfg),
        Commands::Explain { code } => {
            explain::explain(code, &cfg);
            Ok(())
        }
    }
}
