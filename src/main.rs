use clap::Parser;
use stochtrellis::cli::{run, Opts};

fn main() {
    env_logger::init();
    let opts: Opts = Opts::parse();
    if let Err(e) = run(&opts) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
