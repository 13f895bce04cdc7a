pub mod hh_dto;
pub mod menu_dto;
