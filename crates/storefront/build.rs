//! Build script for storefront crate.
//!
//! Hashes the static assets so templates can reference them with a
//! `?v=<hash>` suffix; Telegram's webview caches aggressively.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Files under `static/` that feed the asset version.
const ASSETS: &[&str] = &["app.css", "bridge.js"];

fn main() {
    hash_assets();
}

/// Sets `ASSET_VERSION` for use with `env!("ASSET_VERSION")`.
fn hash_assets() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=ASSET_VERSION=dev");
        return;
    };
    let static_dir = Path::new(&manifest_dir).join("static");

    let mut hasher = Sha256::new();
    for asset in ASSETS {
        let path = static_dir.join(asset);
        println!("cargo:rerun-if-changed={}", path.display());

        match fs::read(&path) {
            Ok(content) => hasher.update(&content),
            Err(e) => println!("cargo:warning=Could not read {asset}: {e}"),
        }
    }

    // First 8 hex chars are plenty for cache busting
    let hash = format!("{:x}", hasher.finalize());
    let short_hash = hash.get(..8).unwrap_or("dev");

    println!("cargo:rustc-env=ASSET_VERSION={short_hash}");
}
