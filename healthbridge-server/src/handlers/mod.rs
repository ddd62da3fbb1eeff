pub mod accounts;
pub mod ai;
pub mod care;
pub mod doctor;
pub mod documents;
pub mod health;
pub mod org;
pub mod patient;
