pub mod cursor;
pub mod diagnostic;
pub mod insert;
pub mod locator;
pub mod peek;
pub mod restore;
pub mod shape;
pub mod side_table;
pub mod source;
pub mod synth;
