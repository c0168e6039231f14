mod agent;
mod cli;
mod config;
mod error;
mod installer;
mod logging;
mod templates;

use error::InstallError;

fn main() {
    logging::init();
    if let Err(err) = cli::run(std::env::args_os().skip(1)) {
        match err.downcast_ref::<InstallError>() {
            Some(InstallError::Usage(message)) => {
                eprintln!("{message}");
                eprintln!("{}", cli::usage());
            }
            _ => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}
