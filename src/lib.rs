#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod display;
pub mod error;
pub mod schedule;
pub mod status;
pub mod timezone;
pub mod weather;

#[cfg(feature = "firmware")]
pub mod network;
#[cfg(feature = "firmware")]
pub mod sleep;
