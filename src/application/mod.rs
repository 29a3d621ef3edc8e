// Application layer - Monitor use case and the ports it drives
pub mod cycle_monitor;
pub mod platform;
pub mod scheduler;
