pub mod aruodas;

pub use aruodas::AruodasScraper;
