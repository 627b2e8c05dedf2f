use clap::Parser;
use deploy_common::args::CliArgs;
use deploy_core::config::DeployArgs;

#[derive(Parser)]
#[command(
    name = "coinflip-deploy",
    version,
    about = "Deploy the CoinFlip contract and verify it on a block explorer"
)]
pub struct Cli {
    #[command(flatten)]
    pub deploy: DeployArgs,
    #[command(flatten)]
    pub args: CliArgs,
}
