use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    fleet::cli::run().await
}
