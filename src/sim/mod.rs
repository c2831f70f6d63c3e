pub mod event;
pub mod level;
pub mod pack;
pub mod parser;
pub mod session;
pub mod step;
