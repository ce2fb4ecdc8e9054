//! Built-in seed catalog.
//!
//! Used when no catalog store is configured or the store is unreachable,
//! so the storefront always has a working product set.

use super::Product;

/// Static seed row; expanded into a full [`Product`] at load time.
struct ProductSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: f64,
    floor_price: f64,
    category: &'static str,
    image: &'static str,
    tags: &'static [&'static str],
}

const PRODUCT_SEEDS: &[ProductSeed] = &[
    ProductSeed {
        id: "prod-aurora-headphones",
        name: "Aurora Wireless Headphones",
        description: "Over-ear wireless headphones with active noise cancelling and 40-hour battery life",
        price: 199.0,
        floor_price: 149.0,
        category: "Audio",
        image: "images/aurora-headphones.jpg",
        tags: &["wireless", "noise-cancelling", "bluetooth"],
    },
    ProductSeed {
        id: "prod-pulse-earbuds",
        name: "Pulse True Wireless Earbuds",
        description: "Compact earbuds with deep bass, sweat resistance and a pocket charging case",
        price: 89.0,
        floor_price: 59.0,
        category: "Audio",
        image: "images/pulse-earbuds.jpg",
        tags: &["wireless", "sport", "compact"],
    },
    ProductSeed {
        id: "prod-orbit-speaker",
        name: "Orbit Smart Speaker",
        description: "Room-filling 360-degree speaker with voice assistant and multi-room pairing",
        price: 129.0,
        floor_price: 99.0,
        category: "Audio",
        image: "images/orbit-speaker.jpg",
        tags: &["smart-home", "voice", "speaker"],
    },
    ProductSeed {
        id: "prod-summit-watch",
        name: "Summit GPS Watch",
        description: "Rugged fitness watch with heart-rate tracking, GPS routes and 14-day battery",
        price: 249.0,
        floor_price: 189.0,
        category: "Wearables",
        image: "images/summit-watch.jpg",
        tags: &["fitness", "gps", "outdoor"],
    },
    ProductSeed {
        id: "prod-drift-band",
        name: "Drift Sleep Band",
        description: "Lightweight band that tracks sleep stages and wakes you in a light phase",
        price: 79.0,
        floor_price: 49.0,
        category: "Wearables",
        image: "images/drift-band.jpg",
        tags: &["sleep", "health", "lightweight"],
    },
    ProductSeed {
        id: "prod-ember-kettle",
        name: "Ember Precision Kettle",
        description: "Gooseneck kettle with 1-degree temperature control for pour-over coffee and tea",
        price: 119.0,
        floor_price: 89.0,
        category: "Kitchen",
        image: "images/ember-kettle.jpg",
        tags: &["coffee", "tea", "precision"],
    },
    ProductSeed {
        id: "prod-crema-grinder",
        name: "Crema Burr Grinder",
        description: "Conical burr coffee grinder with 40 grind settings from espresso to cold brew",
        price: 159.0,
        floor_price: 119.0,
        category: "Kitchen",
        image: "images/crema-grinder.jpg",
        tags: &["coffee", "espresso", "burr"],
    },
    ProductSeed {
        id: "prod-atlas-backpack",
        name: "Atlas Commuter Backpack",
        description: "Weatherproof 22L backpack with padded laptop sleeve and hidden passport pocket",
        price: 139.0,
        floor_price: 99.0,
        category: "Travel",
        image: "images/atlas-backpack.jpg",
        tags: &["commuter", "laptop", "weatherproof"],
    },
    ProductSeed {
        id: "prod-nomad-charger",
        name: "Nomad Travel Charger",
        description: "65W GaN charger with two USB-C ports and folding plug for travel",
        price: 59.0,
        floor_price: 39.0,
        category: "Travel",
        image: "images/nomad-charger.jpg",
        tags: &["usb-c", "gan", "compact"],
    },
    ProductSeed {
        id: "prod-lumen-lamp",
        name: "Lumen Desk Lamp",
        description: "Adjustable desk lamp with wireless charging base and circadian white tones",
        price: 99.0,
        floor_price: 69.0,
        category: "Home",
        image: "images/lumen-lamp.jpg",
        tags: &["desk", "wireless-charging", "led"],
    },
];

/// The built-in default product set.
pub fn default_catalog() -> Vec<Product> {
    PRODUCT_SEEDS
        .iter()
        .map(|seed| Product {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            price: seed.price,
            floor_price: seed.floor_price,
            category: seed.category.to_string(),
            image: seed.image.to_string(),
            tags: seed.tags.iter().map(|t| t.to_string()).collect(),
            embedding: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let products = default_catalog();
        let ids: HashSet<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), products.len());
    }

    #[test]
    fn test_seed_prices_respect_floor() {
        for product in default_catalog() {
            assert!(
                product.floor_price <= product.price,
                "floor above list price for {}",
                product.id
            );
        }
    }
}
