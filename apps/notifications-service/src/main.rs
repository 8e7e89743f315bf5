#[tokio::main]
async fn main() -> eyre::Result<()> {
    notifications_service::run().await
}
