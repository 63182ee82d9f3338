//! Basic session example
//!
//! Usage:
//!   cargo run --example basic_session
//!
//! Reads `STOREFRONT_API_URL`, `STOREFRONT_STORAGE_PATH`, `STOREFRONT_EMAIL`
//! and `STOREFRONT_PASSWORD`.

use storefront_client::types::Credentials;
use storefront_client::view::{Section, ViewController, ViewSurface};
use storefront_client::{ClientConfig, StorefrontClient};

/// Prints section visibility instead of touching a page
struct ConsoleSurface;

impl ViewSurface for ConsoleSurface {
    fn set_visible(&mut self, section: Section, visible: bool) {
        println!("  {section:?}: {}", if visible { "shown" } else { "hidden" });
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env();
    let email = std::env::var("STOREFRONT_EMAIL")
        .unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("STOREFRONT_PASSWORD")
        .unwrap_or_else(|_| "password123".to_string());

    println!("=== Storefront Client Example ===");
    println!("API: {}", config.base_url);
    println!("Storage: {:?}", config.persistence);
    println!();

    let client = StorefrontClient::new(&config)?;

    // Show whatever the stored token selects before logging in
    let mut controller = ViewController::new(client.session().storage().clone(), ConsoleSurface);
    println!("Initial view:");
    let view = controller.load();
    println!("=> {view:?}");
    println!();

    match client.login(&Credentials { email, password }).await {
        Ok(tokens) => println!("✓ Logged in, access token valid for {}s", tokens.expires_in),
        Err(e) => {
            println!("! Login failed: {e}");
            return Ok(());
        }
    }

    println!("View after login:");
    let view = controller.load();
    println!("=> {view:?}");
    println!();

    let products = client.list_products(0, 10).await?;
    println!("Products:");
    for product in &products {
        println!("  - {} ({}) {:.2} x{}", product.title, product.id, product.price, product.stock);
    }
    println!();

    client.logout().await?;
    println!("View after logout:");
    let view = controller.load();
    println!("=> {view:?}");

    Ok(())
}
