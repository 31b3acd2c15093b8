#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod error;
pub mod license;
pub mod scheduler;
pub mod settings;
pub mod triggers;

#[cfg(test)]
mod testing;
