mod handler;
mod model;

pub use handler::{change_password, current_user, login, logout, refresh_token, register};
pub use model::{
    ChangePasswordRequest, ChangePasswordResponse, LoginRequest, LoginResponse, LogoutResponse,
    RefreshTokenRequest, RefreshTokenResponse, RegisterRequest,
};
