//! Terminus application: window, event handling, scene assembly and the
//! fixed-timestep frame loop.

pub mod game_loop;
pub mod renderer;
pub mod scene;
pub mod window;
