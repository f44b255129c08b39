pub mod chart;
pub mod cli;
pub mod results;
pub mod server;
pub mod submit;
