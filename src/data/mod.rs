//! Data module: degrees-of-freedom layouts over structured topologies.

pub mod layout;

pub use layout::DataLayout;
