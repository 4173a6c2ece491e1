pub mod flow;
pub mod outcome;
pub mod service;
pub mod template;
pub mod validate;
