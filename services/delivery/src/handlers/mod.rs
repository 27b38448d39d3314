pub mod deliveries;
pub mod jobs;
pub mod webhook;
