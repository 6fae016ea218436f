use tessera::config::{self, ConfigService};
use tessera::prelude::*;
use tracing_subscriber::EnvFilter;

mod pages;
mod users;
mod users_resource;

use pages::Pages;
use users::Users;
use users_resource::UsersResource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // TESSERA_PORT=3000 TESSERA_LOG_LEVEL=debug cargo run -p example-server
    let settings = ConfigService::from_env("TESSERA_");
    let level = settings.get_or(config::LOG_LEVEL, "info");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("🚀 Starting Example Server...");

    let mut app = Application::builder().config(settings).build();
    app.module(Users::descriptor())?;
    app.resource(UsersResource::descriptor())?;
    app.routes(Pages::descriptor())?;

    app.run().await?;
    Ok(())
}
