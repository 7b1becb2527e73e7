#[derive(serde::Deserialize)]
pub struct Signup {
    #[serde(alias = "fullName")]
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(serde::Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(serde::Deserialize)]
pub struct ForgotPassword {
    pub email: String,
}

#[derive(serde::Deserialize)]
pub struct ResetPassword {
    pub token: String,
    pub password: String,
}

#[derive(serde::Deserialize)]
pub struct UpdatePassword {
    #[serde(alias = "currentPassword")]
    pub current_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}
