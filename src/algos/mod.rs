pub mod transition;
pub mod node2vec;
pub mod struc2vec;
pub mod driver;
