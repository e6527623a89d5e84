pub use acel_bytes as bytes;
pub use acel_pin as pin;
pub use acel_sim as sim;
