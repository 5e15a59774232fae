pub mod compare;
pub mod property;
pub mod returns;
