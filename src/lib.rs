pub mod board;
pub mod movegen;
pub mod evaluation;
pub mod search;
pub mod game;
pub mod console;
