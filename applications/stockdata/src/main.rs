use marketpulse::logger;
use stockdata::{create_app, ServiceSettings, State};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_tracing();

    let settings = ServiceSettings::from_env();
    let state = State::from_settings(&settings)?;
    let app = create_app(state);

    let address = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("stock data service listening on http://{}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
