pub mod booking;
pub mod drafts;
pub mod history;
pub mod pricing;
pub mod validation;
