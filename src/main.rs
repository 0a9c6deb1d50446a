use a11y_audit::cli::{Cli, Command};
use a11y_audit::logging::init_logging;
use a11y_audit::{cmd_fix, cmd_init, cmd_quick_check, cmd_scan};
use clap::Parser;

fn main() {
    init_logging();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Scan(args) => cmd_scan(args),
        Command::QuickCheck(args) => cmd_quick_check(args),
        Command::Fix(args) => cmd_fix(args),
        Command::Init(args) => cmd_init(args),
    };

    std::process::exit(exit_code);
}
