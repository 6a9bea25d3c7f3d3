pub mod bridge;
pub mod fill;
pub mod profile;
pub mod scan;
pub mod utils;
