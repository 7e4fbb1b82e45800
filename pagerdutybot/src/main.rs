// File: pagerdutybot/src/main.rs
use anyhow::Result;
use base::chat::KeybaseConnector;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("pagerdutybot=info".parse()?)
        .add_directive("base=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("aws_config=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting PagerDuty bot");
    let code = pagerdutybot::run(std::env::args_os(), Arc::new(KeybaseConnector)).await;
    Ok(ExitCode::from(code))
}
