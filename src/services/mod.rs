pub mod crm;
pub mod establishments;
pub mod scheduling;
pub mod validation;
