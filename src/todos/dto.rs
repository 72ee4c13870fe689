use serde::Deserialize;
use time::Date;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub due_date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct TodoFilter {
    pub complete: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_due_date_is_optional() {
        let req: CreateTodoRequest =
            serde_json::from_str(r#"{"title":"t","description":"d"}"#).unwrap();
        assert!(req.due_date.is_none());
    }
}
