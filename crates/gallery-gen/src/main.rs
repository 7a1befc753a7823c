mod builder;
mod config;
mod error;
mod preview;
mod tags;

use tracing::info;
use tracing_subscriber::EnvFilter;

use builder::ManifestBuilder;
use config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env();
    info!(
        templates_dir = %config.templates_dir.display(),
        previews_dir = %config.previews_dir.display(),
        output_file = %config.output_file.display(),
        "configuration loaded"
    );

    ManifestBuilder::new(config)
        .generate()
        .inspect_err(|e| tracing::error!(error = %e, "metadata generation failed"))?;
    Ok(())
}
