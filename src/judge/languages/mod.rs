pub mod cpp;
pub mod lua;
pub mod python;
