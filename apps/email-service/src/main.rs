#[tokio::main]
async fn main() -> eyre::Result<()> {
    email_service::run().await
}
