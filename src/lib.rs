#![cfg_attr(feature = "no-std", no_std)]

extern crate alloc;

pub mod collections;
