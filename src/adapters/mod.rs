pub mod realtor;
pub mod zillow;
