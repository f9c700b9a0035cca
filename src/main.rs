#[tokio::main]
async fn main() {
    if let Err(e) = favorites::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
