// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use extractrs::engines::fetcher::{Fetcher, FetcherConfig};
use extractrs::engines::http_engine::HttpEngine;
use extractrs::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// A fetcher wired for tests: fast backoff, no jitter, no browser.
pub fn test_fetcher() -> Arc<Fetcher> {
    let config = FetcherConfig {
        timeout: Duration::from_secs(5),
        min_content_length: 50,
        browser_fallback: false,
        ..Default::default()
    };
    let policy = RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        jitter_factor: 0.0,
        enable_jitter: false,
    };
    Arc::new(Fetcher::new(Arc::new(HttpEngine), None, config, policy))
}

/// A structurally valid product page that passes response validation.
pub fn product_page(name: &str, price: &str, image_path: &str) -> String {
    let filler = "This product is produced in a small family workshop with attention \
        to every detail and shipped across the country. "
        .repeat(4);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>{name} | Test Shop</title>
<script type="application/ld+json">
{{"@context": "https://schema.org", "@type": "Product",
  "name": "{name}",
  "description": "{filler}",
  "image": "{image_path}",
  "offers": {{"@type": "Offer", "price": "{price}", "priceCurrency": "USD"}}}}
</script>
</head>
<body>
<header><nav><a href="/">Home</a></nav></header>
<main>
  <h1 class="product_title">{name}</h1>
  <p class="price">{price}</p>
  <div class="description"><p>{filler}</p></div>
  <div class="gallery"><img src="{image_path}"></div>
  <section><p>{filler}</p></section>
</main>
<footer><p>All rights reserved.</p></footer>
</body>
</html>"#
    )
}
