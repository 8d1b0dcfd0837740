pub mod direct_method;
pub mod matrix_builder;
pub mod nonlinear_method;
pub mod ranking_engine;

pub use direct_method::*;
pub use matrix_builder::*;
pub use nonlinear_method::*;
pub use ranking_engine::*;
