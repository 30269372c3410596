//! Interactive four-stroke engine cycle visualizer for the terminal.
//!
//! The crank angle drives everything: [`kinematics::EngineFrame`] derives the
//! piston, rod, valves, spark and chamber gas from it, [`stroke::Stroke`]
//! classifies it, and the renderer draws the result with a small software
//! rasterizer into half-block terminal cells.

pub mod app;
pub mod camera;
pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod graphics;
pub mod info;
pub mod kinematics;
pub mod math;
pub mod mesh;
pub mod part;
pub mod scene;
pub mod state;
pub mod stroke;
pub mod term;
pub mod ui;
pub mod vertex;
pub mod widget;
