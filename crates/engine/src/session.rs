use uuid::Uuid;

/// Who is acting, passed explicitly to every mutating engine call.
///
/// The component crates have no notion of a current user; the session only
/// tags log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    operator: String,
    session_id: Uuid,
}

impl SessionContext {
    pub fn new(operator: impl Into<String>) -> Self {
        Self::with_id(operator, Uuid::now_v7())
    }

    pub fn with_id(operator: impl Into<String>, session_id: Uuid) -> Self {
        Self {
            operator: operator.into(),
            session_id,
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn span(&self) -> tracing::Span {
        billforge_observability::session_span(&self.session_id.to_string(), &self.operator)
    }
}
