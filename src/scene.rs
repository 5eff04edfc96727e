pub mod chip;
pub mod trace;
pub mod trail;
