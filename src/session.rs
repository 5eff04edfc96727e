pub mod animation;
pub mod headless;
pub mod host;
