pub mod discovery;
pub mod drivers;
pub mod fare;
pub mod lifecycle;
