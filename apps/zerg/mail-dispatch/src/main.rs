//! Mail Dispatch entry point

use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::Environment;
use eyre::Result;
use zerg_mail_dispatch::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    zerg_mail_dispatch::run(Cli::parse()).await
}
