pub mod board;
pub mod controller;
pub mod hit;
pub mod input;
pub mod listeners;
pub mod session;
