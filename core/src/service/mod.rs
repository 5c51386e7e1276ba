pub mod class_gateway;
pub mod dto;
