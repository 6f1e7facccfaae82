use tracing::error;
use tuum_session::config::{load_config, print_schema};
use tuum_session::startup::{self, Command};
use tuum_session::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match startup::parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if command == Command::Schema {
        if let Err(e) = print_schema() {
            eprintln!("Failed to print schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = load_config();
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(config, command).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
