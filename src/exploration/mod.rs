mod greedy;

pub use greedy::Greedy;
