pub mod poll;
pub mod vote;
