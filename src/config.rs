//! Server configuration

use clap::Parser;

/// Command line options, each with an environment fallback
#[derive(Parser, Debug, Clone)]
#[command(name = "starwars-graphql")]
#[command(about = "Star Wars GraphQL schema served over a document store")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "STARWARS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(short, long, env = "STARWARS_PORT", default_value_t = 4000)]
    pub port: u16,

    /// Start with an empty store instead of the seeded characters
    #[arg(long)]
    pub no_seed: bool,

    /// Print the schema in SDL form and exit
    #[arg(long)]
    pub print_schema: bool,

    /// Log filter directive, e.g. `debug` or `starwars_graphql=trace`
    #[arg(long, env = "STARWARS_LOG")]
    pub log: Option<String>,
}

impl Config {
    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
