use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = slideshowctl::Cli::parse();
    slideshowctl::init_tracing(cli.verbose);
    if let Err(err) = slideshowctl::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
