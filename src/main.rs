#[tokio::main]
async fn main() -> std::io::Result<()> {
    battle_tanks::run_with_config().await
}
