#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    sable::runtime::run().await
}
