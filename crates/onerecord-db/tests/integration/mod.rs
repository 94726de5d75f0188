pub mod common;
mod inbound_tests;
mod logistics_object_tests;
