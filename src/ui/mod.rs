pub mod charts;
pub mod pages;
pub mod panels;
pub mod table;
