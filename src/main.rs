use survey_intake::cli::run_cli;
use survey_intake::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging(&LogConfig::from_env())?;
    run_cli()
}
