#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tmdb_proxy_lib::run().await?;
    Ok(())
}
