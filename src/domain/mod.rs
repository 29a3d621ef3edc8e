// Domain layer - Cycle inference, independent of the platform
pub mod cycle_state;
pub mod display;
pub mod notification;
pub mod rolling_buffer;
pub mod telemetry;
