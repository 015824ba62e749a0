pub mod fileset;
pub mod node;
pub mod pool;
pub mod quota;
