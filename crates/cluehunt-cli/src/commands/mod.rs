pub mod admin;
pub mod print;
pub mod serve;
pub mod status;
