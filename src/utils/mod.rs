//! The `utils` module holds definitions shared across `topicreg`: the error
//! types returned by the registry and the logging setup used by the binary.

pub mod error;
pub mod logging;
