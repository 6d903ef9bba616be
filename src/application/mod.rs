pub mod dto;
pub mod ports;
pub mod services;
pub mod settings;

#[cfg(test)]
pub mod fakes;
