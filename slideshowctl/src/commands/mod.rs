pub mod check;
pub mod convert;
