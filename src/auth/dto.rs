use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_serializes_access_token() {
        let response = LoginResponse {
            access_token: "abc123".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"access_token":"abc123"}"#);
    }

    #[test]
    fn register_request_deserializes() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"pw123456"}"#).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert_eq!(req.password, "pw123456");
    }
}
