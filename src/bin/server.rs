use boutique::config::Config;
use boutique::{server, Error};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    server::run(config).await
}
