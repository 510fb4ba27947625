pub mod hasher;
pub mod repositories;
pub mod tokens;
