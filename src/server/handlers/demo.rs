use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Static sample configuration for the landing page.
pub async fn demo() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "demo": {
            "name": "Acme Support Assistant",
            "ragType": "hybrid",
            "vectorDb": "chroma",
            "useCase": "customer support",
            "theme": "ocean",
            "features": ["memory", "citations"],
            "sources": [
                "https://acme.example/faq",
                "returns-policy.pdf"
            ],
            "conversation": [
                {
                    "role": "user",
                    "content": "How long do I have to return an item?"
                },
                {
                    "role": "bot",
                    "content": "You can return any unused item within 30 days of delivery for a full refund. [1]"
                }
            ]
        }
    }))
}
