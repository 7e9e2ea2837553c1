pub mod auth;
pub mod companies;
pub mod doctors;
pub mod health;
pub mod patients;
pub mod payment_letters;
pub mod roles;
pub mod web_users;
