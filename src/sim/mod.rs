mod car;
mod car_config;
mod car_controls;
mod collision;
mod controller;
mod course;
pub mod dynamics;
mod police;
mod race;
mod race_config;
mod racer;
mod road_network;
mod spatial_grid;
mod surface;
mod track;
mod traffic;

pub use car::*;
pub use car_config::*;
pub use car_controls::*;
pub use controller::Controller;
pub use course::*;
pub use police::*;
pub use race::*;
pub use race_config::*;
pub use racer::*;
pub use road_network::*;
pub use spatial_grid::*;
pub use surface::*;
pub use track::*;
pub use traffic::*;
