pub mod ports;
pub mod scrub_use_case;
