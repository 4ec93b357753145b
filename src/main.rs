//! headless bootstrap: generate the world, drop the player at the spawn
//! point and step physics at 60 Hz
//!
//! Works with **Bevy 0.15**.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::diagnostic::{DiagnosticsPlugin, FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;

use tile_world::WorldPlugin;

fn main() {
    App::new()
        /* bevy core (no window) ------------------------------------------- */
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))))
        .add_plugins(LogPlugin::default())

        /* diagnostics ----------------------------------------------------- */
        .add_plugins((
            DiagnosticsPlugin,
            LogDiagnosticsPlugin::default(),
            FrameTimeDiagnosticsPlugin::default(),
        ))

        /* world ----------------------------------------------------------- */
        .add_plugins(WorldPlugin)
        .run();
}
