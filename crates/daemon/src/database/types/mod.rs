mod dbool;

pub use dbool::DBool;
