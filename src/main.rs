use miette::Result;
use oro_login::OroLogin;

#[async_std::main]
async fn main() -> Result<()> {
    OroLogin::load().await
}
