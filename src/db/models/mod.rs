pub mod category;
pub mod paper;
pub mod paper_category;
