pub mod show;
pub mod version;
