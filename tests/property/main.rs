// tests/property/main.rs

//! Property tests, one module per subsystem.

mod protocol;
