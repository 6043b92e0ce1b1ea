use shopsight_sdk::ShopsightError;

/// Error printed as `{"error": "...", "kind": "..."}` before exiting.
pub struct DemoError {
    pub kind: &'static str,
    pub message: String,
}

impl DemoError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self {
            kind: "usage",
            message: msg.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            "usage" | "config" => 4,
            "backend" => 3,
            _ => 1,
        }
    }
}

impl From<ShopsightError> for DemoError {
    fn from(e: ShopsightError) -> Self {
        let kind = match &e {
            ShopsightError::Config(_) | ShopsightError::InvalidArgument(_) => "config",
            ShopsightError::Fetch(_) | ShopsightError::Http(_) => "backend",
            _ => "internal",
        };
        Self {
            kind,
            message: e.to_string(),
        }
    }
}
