//! Generic Access Profile types: device addresses and advertising payloads

pub mod advertising;
pub mod constants;
pub mod types;

#[cfg(test)]
mod tests;

pub use advertising::{parse_advertising_data, AdvertisingDataBuilder};
pub use constants::*;
pub use types::*;
