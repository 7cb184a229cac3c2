#[tokio::main]
async fn main() {
    contractor_booking::run().await;
}
