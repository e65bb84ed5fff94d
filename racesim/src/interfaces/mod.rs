pub mod animation_driver;
pub mod color_names;
pub mod presentation_interface;
