// src/main.rs

use procrun::{cli, errors, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("procrun error: {err}");
        std::process::exit(errors::exit_code(&err));
    }
}

async fn run_main() -> errors::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
