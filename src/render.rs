pub(crate) mod blur;
pub(crate) mod composite;
pub mod cpu;
pub mod recording;
pub mod surface;
