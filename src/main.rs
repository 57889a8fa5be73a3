use std::sync::Arc;

use clap::Parser;
use starwars_graphql::config::Config;
use starwars_graphql::handler::{create_router, GRAPHQL_PATH};
use starwars_graphql::{schema, seed, MemoryStore, SharedStore};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    if config.print_schema {
        println!("{}", schema::sdl());
        return Ok(());
    }

    let filter = match &config.log {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store: SharedStore = Arc::new(MemoryStore::new());
    if config.no_seed {
        info!("starting with an empty store");
    } else {
        let seeded = seed::seed_characters(store.as_ref()).await?;
        info!(luke = %seeded.luke, vader = %seeded.vader, artoo = %seeded.artoo, "seed data loaded");
    }

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    info!("GraphQL endpoint available at http://{}{}", bind_address, GRAPHQL_PATH);
    info!("GraphiQL available at http://{}{}", bind_address, GRAPHQL_PATH);

    axum::serve(listener, create_router(store)).await?;

    Ok(())
}
