use tracing_subscriber::EnvFilter;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::load()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "wallettrack={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // The connection is opened (and migrated) by the first request.
    let engine = engine::Engine::builder()
        .database_url(settings.server.database.url())
        .build()?;
    let verifier = server::JwtVerifier::new(settings.auth.jwt_secret.as_bytes());

    let addr = settings.address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return Err(err.into());
        }
    };

    server::run_with_listener(server::ServerState::new(engine, verifier), listener).await?;

    Ok(())
}
