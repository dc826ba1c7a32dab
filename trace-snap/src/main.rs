use clap::Parser;
use log::error;
use trace_snap::app::cli::cli_args::CliArgs;
use trace_snap::app::cli::run;

fn main() {
    env_logger::init();

    let args = CliArgs::parse();
    match run::command_line_runner(&args) {
        Ok(_) => {}
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
