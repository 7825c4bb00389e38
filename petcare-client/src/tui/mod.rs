pub mod devices;
pub mod pets;
pub mod table;
