pub mod air_quality;
pub mod catalog;
pub mod dashboard;
pub mod llm;
pub mod openweather;
pub mod synthetic;
pub mod tutor;
