//! Lumen viewer
//!
//! Usage: `lumen-viewer [ASSET_ROOT]`. The asset root defaults to `assets`.

use lumen::{Viewer, ViewerConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = ViewerConfig::default();
    if let Some(root) = std::env::args().nth(1) {
        config = config.with_asset_root(root);
    }

    log::info!("Loading assets from {}", config.asset_root.display());
    Viewer::new(config).run()
}
