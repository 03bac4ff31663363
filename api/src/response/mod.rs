use serde::Serialize;

/// JSON envelope for every `/api` response:
///
/// ```json
/// { "success": true, "data": { "id": 4, "mark_display": "7 out of 10" }, "message": "Issue updated" }
/// ```
///
/// Errors carry `T::default()` as `data`:
///
/// ```json
/// { "success": false, "data": null, "message": "Issue not found" }
/// ```
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

/// Payload for responses that carry no data.
#[derive(Serialize, Default)]
pub struct Empty;

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope_has_empty_data() {
        let value = serde_json::to_value(ApiResponse::<Empty>::error("Issue not found")).unwrap();
        assert_eq!(
            value,
            json!({ "success": false, "data": null, "message": "Issue not found" })
        );
    }
}
