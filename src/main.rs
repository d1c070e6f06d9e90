#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    fir_generator_server::run().await
}
