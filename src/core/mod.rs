pub mod axis;
pub mod io;
pub mod model;
pub mod parse;
