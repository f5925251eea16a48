//! `cipherbank keygen` - request FHE keys for an identifier

use crate::client::KeyGenClient;
use crate::display;

pub async fn run(client: &KeyGenClient, id: &str) -> anyhow::Result<()> {
    display::section("FHE key generation");
    display::info(&format!("Requesting keys for {} from {}", id, client.base_url()));

    let keys = client.generate_keys(id).await?;

    display::success("Keys generated");
    display::kv("fhe_public_key", &keys.public_key);
    display::kv("client_key", &keys.client_key);
    Ok(())
}
