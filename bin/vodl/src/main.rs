use clap::Parser;
use vodl_cli::VodlArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = VodlArgs::parse();

    let default_level = if args.verbose {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.run().await {
        Ok(()) => {
            println!("vod downloaded successfully!");
            Ok(())
        }
        Err(e) => {
            log::error!("error occurred downloading vod: {e}");
            std::process::exit(1);
        }
    }
}
