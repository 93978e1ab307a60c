pub mod projection;
pub mod reporting;
