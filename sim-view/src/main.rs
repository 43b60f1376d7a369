//! Application entry point for the 3D SCA tree viewer.
//!
//! This binary initializes logging, loads the growth configuration and
//! delegates all interactive logic and rendering to [`Viewer`].

mod viewer;

use sca3d_core::GrowthConfig;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Configuration is read from `config/default.toml`, `config/user.toml`
/// and `SCA_*` environment variables; if loading fails the defaults are
/// used and a warning is logged.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let cfg = GrowthConfig::load().unwrap_or_else(|e| {
        log::warn!("{e}. Using defaults.");
        GrowthConfig::default()
    });

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "3D SCA Tree",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(cfg)))),
    )
}
