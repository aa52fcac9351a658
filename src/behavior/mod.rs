pub mod tree;

pub use tree::{Action, Condition, Node, Status};
