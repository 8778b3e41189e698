//! Application entry point for the Pipe Dreams screensaver.
//!
//! This binary sets up logging and eframe/egui, and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod camera;
mod fps;
mod viewer;

use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging goes through `env_logger`; set `RUST_LOG=pipe_core=debug` to
/// see why individual pipes stop.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions::default();
    let result = eframe::run_native(
        "Pipe Dreams",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new(viewer::scene_config())))),
    );

    if let Err(err) = &result {
        log::error!("could not start the viewer: {err}");
    }
    result
}
