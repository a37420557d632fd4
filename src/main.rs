use anyhow::Result;
use square::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
