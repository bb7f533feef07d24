use codehud_bridge::{shell, util};
use codehud_core::HudConfig;

fn main() -> anyhow::Result<()> {
    util::init_tracing();
    util::install_panic_hook();

    let config = HudConfig::load()?;
    shell::run(config)
}
