mod clock;
mod config;

pub use clock::{Clock, FixedClock, SystemClock, iso_timestamp};
pub use config::AppConfig;
