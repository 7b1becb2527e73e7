pub mod dto;
pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod me;
pub mod reset_password;
pub mod signup;
pub mod update_password;
pub mod utils;
