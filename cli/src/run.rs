use clap::{Parser, Subcommand};

use crate::commands::{apply::Apply, resolve::Resolve};
use crate::context::{Context, GlobalArgs};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Command,
    #[clap(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Server-side apply a single manifest
    Apply(Box<Apply>),
    /// Show the REST endpoint a manifest maps to
    Resolve(Resolve),
}

impl Command {
    pub async fn run(self, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Self::Apply(apply) => apply.run(context).await,
            Self::Resolve(resolve) => resolve.run(context).await,
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let context = Context::load(args.global).await?;
    args.command.run(&context).await?;
    Ok(())
}
