use anyhow::Result;

use careerai::run_cli;

#[tokio::main]
async fn main() -> Result<()> {
    run_cli().await
}
