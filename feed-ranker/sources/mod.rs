pub mod in_network_source;
pub mod out_of_network_source;
pub mod request_pool_source;
