pub mod browsers;
pub mod collect;
pub mod config;
pub mod digest;
pub mod fonts;
