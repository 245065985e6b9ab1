use tracing_subscriber::EnvFilter;

mod command;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    // stdout carries JSON output only
    let filter =
        EnvFilter::try_from_env("FILMCUT_LOG").unwrap_or_else(|_| EnvFilter::new("filmcut=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    command::run()
}
