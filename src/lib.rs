// Library for tests to access modules

pub mod agent;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host_profile;
pub mod models;
pub mod net_rate;
pub mod sampler;
pub mod scheduler;
pub mod source;
pub mod sysinfo_repo;
pub mod version;
