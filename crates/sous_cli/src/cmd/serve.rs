use crate::{Ctx, Result, chat::ChatManager, server};

#[derive(Debug, clap::Args)]
pub(crate) struct Serve {
    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = 7860)]
    port: u16,
}

impl Serve {
    pub(crate) async fn run(self, ctx: &Ctx) -> Result<()> {
        let chat = ChatManager::new(ctx.provider.clone(), ctx.tools.clone());
        server::serve(&self.address, self.port, chat).await?;

        Ok(())
    }
}
