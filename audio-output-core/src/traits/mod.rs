pub mod delegate;
pub mod device;
pub mod producer;
