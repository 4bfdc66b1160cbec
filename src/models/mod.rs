pub mod license;
pub mod module;
