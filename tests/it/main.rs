mod meta;
mod transactions;
pub mod utils;

fn main() {}
