use clap::Args;

use crate::config::Config;

#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Namespace for namespace-scoped objects that do not set one
    #[arg(global = true, long, short = 'n')]
    namespace: Option<String>,
    /// Field manager the apply is attributed to
    #[arg(global = true, long)]
    field_manager: Option<String>,
}

pub struct Context {
    pub client: kapply::Client,
    pub config: Config,
}

impl Context {
    pub async fn load(global: GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Config::load()?;
        if let Some(namespace) = global.namespace {
            config.namespace = Some(namespace);
        }
        if let Some(name) = global.field_manager {
            config.name = name;
        }
        let mut client_builder = kapply::Client::builder();
        client_builder.name(&config.name);
        if let Some(namespace) = config.namespace.as_ref() {
            client_builder.namespace(namespace);
        }
        let client = client_builder.build().await?;
        tracing::debug!(
            "Applying as {} with default namespace {}",
            client.name(),
            client.default_namespace()
        );
        Ok(Self { client, config })
    }
}
