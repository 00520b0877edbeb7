pub mod error;
pub mod graph;
pub mod manifest;
pub mod rules;
pub mod scheduler;
pub mod shell;

pub use error::Error;
pub use graph::{build, Node};
pub use rules::{RecipeFn, Registry, RuleBinder};
pub use scheduler::{execute, run};
pub use shell::sh;
