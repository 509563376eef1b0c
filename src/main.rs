#[tokio::main]
async fn main() -> anyhow::Result<()> {
    persona_tutor_lib::run().await
}
