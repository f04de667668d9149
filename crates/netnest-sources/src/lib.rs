// netnest-sources: status sources behind the netnest dashboard
//
// Each backend (UniFi controller, Govee cloud + LAN, Tailscale CLI,
// Ookla probe, in-house agents) gets one client that normalizes its
// records and absorbs its failures; `hub::StatusHub` fronts them all.

pub mod agents;
pub mod cache;
pub mod error;
pub mod govee;
pub mod hub;
pub mod model;
pub mod process;
pub mod speedtest;
pub mod tailscale;
pub mod transport;
pub mod unifi;

pub use error::{Error, Result};
pub use hub::{HubConfig, StatusHub};
pub use model::{ControlCommand, ControlOutcome, Device, DeviceStatus, Inventory};
