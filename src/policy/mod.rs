//! Configuration of the built-in placement policies

pub mod memtier;
