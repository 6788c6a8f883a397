use std::path::PathBuf;

use clap::Args;
use kapply::ResourceDescriptor;

use crate::context::Context;
use crate::manifest;

#[derive(Args, Debug)]
pub struct Resolve {
    /// Manifest to resolve, `-` for stdin
    #[arg(short = 'f', long)]
    filename: PathBuf,
}

impl Resolve {
    pub async fn run(self, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let object = manifest::read(&self.filename)?;
        let descriptor = ResourceDescriptor::from_object(&object)?;
        let resolved = context.client.resolve(&object).await?;
        println!("kind:      {descriptor}");
        println!("resource:  {}", resolved.handle.mapping().resource.plural);
        println!("scope:     {}", resolved.handle.scope());
        println!(
            "namespace: {}",
            resolved.handle.namespace().unwrap_or("-")
        );
        println!("endpoint:  {}", resolved.handle);
        Ok(())
    }
}
