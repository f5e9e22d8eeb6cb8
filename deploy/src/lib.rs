pub mod artifacts;
pub mod deployer;
pub mod error;
pub mod logging;
pub mod params;
pub mod shared;
