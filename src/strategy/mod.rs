pub mod algorithms;
pub mod patterns;
pub mod traits;
