pub mod batch;
pub mod convert;
pub mod profiles;
pub mod serve;
