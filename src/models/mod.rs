pub mod event;
pub mod post;
pub mod society;
pub mod user;
