pub mod login;
mod logout;
