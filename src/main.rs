#[tokio::main]
async fn main() {
    if let Err(e) = medguard_lib::run().await {
        tracing::error!("{e}");
        eprintln!("medguard: {e}");
        std::process::exit(1);
    }
}
