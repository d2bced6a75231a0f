use std::error::Error;

use tracing_subscriber::{EnvFilter, fmt};

pub const ENV_LOG: &str = "QUIZ_LOG";
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Call once, before any service is built.
pub fn init_tracing(json: bool) -> Result<(), Box<dyn Error>> {
    let filter =
        EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = fmt().with_env_filter(filter).with_target(false);

    if json {
        builder
            .json()
            .try_init()
            .map_err(|err| -> Box<dyn Error> { err })?;
    } else {
        builder
            .compact()
            .try_init()
            .map_err(|err| -> Box<dyn Error> { err })?;
    }

    Ok(())
}
