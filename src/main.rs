#[tokio::main]
async fn main() {
    if let Err(e) = lifesync_lib::run().await {
        tracing::error!("{e}");
        eprintln!("lifesync: {e}");
        std::process::exit(1);
    }
}
