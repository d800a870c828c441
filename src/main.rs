use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let app = kindling::get_client()?;
    app.verify().await?;

    tracing::info!(
        project_id = app.project_id(),
        client_email = app.client_email(),
        "Firebase Admin client ready"
    );

    Ok(())
}
