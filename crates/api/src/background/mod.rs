//! Background tasks spawned by the server binary.

pub mod auto_close;
