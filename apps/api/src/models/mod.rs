pub mod cv;
pub mod document;
pub mod user;
