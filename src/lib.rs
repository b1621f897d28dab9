pub mod app;
pub mod boot;
pub mod bootloader;
pub mod config;
pub mod desktop;
pub mod dom;
pub mod error;
pub mod logging;
pub mod login;
pub mod nav;
pub mod phase;
pub mod picker;
pub mod post;
pub mod screen;
pub mod timers;

pub use app::{BootSim, SimOptions, Simulation};
pub use config::{BootConfig, ThemeList};
pub use error::{BootError, Result};
pub use nav::{step, Key};
pub use phase::{Flow, Phase};
