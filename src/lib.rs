#[allow(non_snake_case)]
pub mod MpcControl;
#[allow(non_snake_case)]
pub mod Reactor;
#[allow(non_snake_case)]
pub mod Solver;
#[allow(non_snake_case)]
pub mod Utils;
