pub mod authorize;
pub mod contracts;
pub mod groups;
pub mod health;
pub mod policies;
pub mod subjects;
