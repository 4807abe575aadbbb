pub mod bar;
pub mod interval;
pub mod price_field;
pub mod request;
pub mod request_params;
