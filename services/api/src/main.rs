use property_desk_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("property desk error: {err}");
        std::process::exit(1);
    }
}
