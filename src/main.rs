use anyhow::Result;

use refract::bootstrap::setup::initialize;
use refract::build_rocket;

#[rocket::main]
async fn main() -> Result<()> {
    initialize();
    build_rocket().launch().await?;
    Ok(())
}
