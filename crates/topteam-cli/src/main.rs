// topteam entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr; stdout carries only the report)
// 2. Load config
// 3. Install the Ctrl+C handler
// 4. Load players, build the pool, run the search
// 5. Print the report

use topteam_cli::{app, config, output};

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("topteam starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: source={:?}, {} trials, {}s timeout",
        config.source.kind, config.search.trials, config.search.timeout_secs
    );

    let cancel = app::cancel_on_ctrl_c();
    let report = app::run(&config, cancel).await?;

    let rendered =
        output::render(&report, config.output.format).context("failed to render report")?;
    println!("{}", rendered.trim_end());

    info!("topteam finished");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("topteam=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
