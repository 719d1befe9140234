// src/main.rs

use autoreload::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        // The console's stdin read may still be parked on a blocking thread.
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("autoreload error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
