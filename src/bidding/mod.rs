pub mod engine;
pub mod markup;
pub mod native;
pub mod request_builder;
pub mod response_mapper;
pub mod usersync;
pub mod vendor_client;
