//! Browse listings and watch the session.
//!
//! Searches rental listings in a city, prints them with their cover image
//! URL, and, when a stored session exists, lists the user's favorites.
//!
//! Run with:
//! ```bash
//! ESTATE_API_URL=http://localhost:8000/api RUST_LOG=estate_session=debug \
//!     cargo run --example browse_listings -- Sangrur
//! ```

use estate::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn reset_to_entry(&self) {
        println!("-> back to the login screen");
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &SessionNotice) {
        println!("[{}] {}", notice.title, notice.message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let city = std::env::args().nth(1).unwrap_or_else(|| "Sangrur".to_string());
    let client = EstateClient::from_env("estate-session.json")?;
    let controller =
        client.spawn_controller(Arc::new(ConsoleNavigator), Arc::new(ConsoleNotifier));

    let filter = PropertyFilter::new()
        .listing_type(ListingType::Rent)
        .city(city.as_str())
        .price(PriceRange::Under50Lakh);

    println!("Rentals in {} under 50 lakh:\n", city);
    for listing in client.list_properties(&filter).await? {
        let cover = listing
            .cover_image()
            .map(|image| client.media_url(&image.image))
            .unwrap_or_default();
        println!(
            "#{:<5} {:<40} {:>12} {}",
            listing.id,
            listing.title.as_deref().unwrap_or("(untitled)"),
            listing.price.map(|p| format!("{:.0}", p)).unwrap_or_default(),
            cover
        );
    }

    if client.is_logged_in().await {
        match client.favorites().await {
            Ok(favorites) => println!("\n{} saved listings", favorites.len()),
            Err(e) if e.is_unauthorized() => println!("\nSession is no longer valid"),
            Err(e) => return Err(e.into()),
        }
    }

    drop(client);
    controller.join().await;
    Ok(())
}
