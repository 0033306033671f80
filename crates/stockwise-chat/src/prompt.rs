//! Prompt template for retail stock insights.

use crate::types::{ChatMessage, SummaryRequest};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant for retail product stock insights.";

/// System + user messages embedding the context and query verbatim.
pub fn build_messages(request: &SummaryRequest) -> Vec<ChatMessage> {
    let user_prompt = format!(
        "Tu es un assistant pour un supermarché. Utilise les informations suivantes pour \
         générer des insights sur les produits en stock, leurs fabricants, prix et livraisons :\n\n\
         {}\n\
         Requête de l'utilisateur : {}\n\n\
         Fournis un résumé clair et utile basé sur la requête de l'utilisateur \
         (en français, anglais ou arabe).",
        request.context, request.query
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_embed_query_and_context() {
        let request = SummaryRequest {
            query: "Quels produits sont en rupture ?".into(),
            context: "Nom de l'article : Lait\nStock : 5 unités\n\n".into(),
        };
        let messages = build_messages(&request);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains(&request.context));
        assert!(messages[1]
            .content
            .contains("Requête de l'utilisateur : Quels produits sont en rupture ?"));
    }

    #[test]
    fn test_empty_context_still_asks() {
        let request = SummaryRequest {
            query: "stock café".into(),
            context: String::new(),
        };
        let user = &build_messages(&request)[1].content;
        assert!(user.starts_with("Tu es un assistant pour un supermarché."));
        assert!(user.ends_with("(en français, anglais ou arabe)."));
    }
}
