use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use kapply::ApplyParams;

use super::{OutputFormat, summary};
use crate::context::Context;
use crate::manifest;

#[derive(Args, Debug)]
pub struct Apply {
    /// Manifest to apply, `-` for stdin
    #[arg(short = 'f', long)]
    filename: PathBuf,
    /// Take ownership of fields managed by someone else
    #[arg(long)]
    force: bool,
    /// Have the server validate the apply without persisting it
    #[arg(long)]
    dry_run: bool,
    /// Give up after this many seconds, overrides KAPPLY_TIMEOUT_SECS
    #[arg(long = "timeout", value_name = "SECS")]
    timeout_secs: Option<u64>,
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,
}

impl Apply {
    pub fn params(&self, context: &Context) -> ApplyParams {
        let mut params = ApplyParams::new()
            .with_force(self.force)
            .with_dry_run(self.dry_run);
        if let Some(secs) = self.timeout_secs.or(context.config.timeout_secs) {
            params = params.with_timeout(Duration::from_secs(secs));
        }
        params
    }

    pub async fn run(self, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let object = manifest::read(&self.filename)?;
        let applied = context.client.apply(&object, &self.params(context)).await?;
        tracing::debug!("Applied through {}", applied.handle);
        match self.output {
            Some(format) => println!("{}", format.render(&applied.object)?),
            None => println!("{}", summary(&applied.object)),
        }
        Ok(())
    }
}
