//! Guards wrapped around in-process execution of untrusted samples.

pub mod containment;
pub mod privileges;
pub mod time_limit;
