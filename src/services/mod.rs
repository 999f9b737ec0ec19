pub mod insights;
pub mod providers;
pub mod recommendation;
