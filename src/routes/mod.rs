pub mod forecast;
pub mod pages;
