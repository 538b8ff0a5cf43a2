pub mod contract_spec;

pub use contract_spec::ContractSpec;
