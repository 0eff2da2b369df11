// Prompt builders for theme discovery and categorization.
//
// Prompts are in Portuguese because the reviews and the resulting theme
// names are shown to Portuguese-speaking users.

use super::provider::CompletionRequest;
use crate::output::truncate_chars;
use crate::reviews::Review;

/// Name of the catch-all theme.
pub const FALLBACK_THEME: &str = "Outros";
pub const FALLBACK_DESCRIPTION: &str = "Reviews que não se encaixam claramente em outras categorias";

const DISCOVERY_SYSTEM: &str = "Você é um especialista em análise de feedback de usuários e \
identificação de temas principais. Sempre responda apenas com JSON válido.";
const CATEGORIZATION_SYSTEM: &str =
    "Você é um especialista em categorizar feedback de usuários. Sempre responda apenas com JSON válido.";

const DISCOVERY_TEXT_CHARS: usize = 200;
const CATEGORIZATION_TEXT_CHARS: usize = 150;

/// A theme proposed by the discovery phase.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredTheme {
    pub name: String,
    pub description: String,
}

/// Build the discovery prompt over the sampled reviews.
pub fn discovery_request(sample: &[&Review]) -> CompletionRequest {
    let reviews_text = sample
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. [{}★] {}",
                i + 1,
                r.rating,
                truncate_chars(&r.text, DISCOVERY_TEXT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Analise estes reviews de app e identifique os principais temas/tópicos sendo discutidos. \
Para cada tema, forneça um nome conciso (2-4 palavras em português) e uma breve descrição.

Reviews:
{reviews_text}

Retorne um array JSON com esta estrutura:
[
  {{
    \"theme\": \"Nome do Tema\",
    \"description\": \"Breve descrição do que este tema cobre\"
  }}
]

Importante:
- Identifique 5-12 temas significativos
- Temas devem ser específicos e práticos
- Foque no que os usuários estão realmente discutindo
- Use nomes claros e descritivos em português
- Responda APENAS com JSON válido, sem outro texto"
    );

    CompletionRequest {
        system: DISCOVERY_SYSTEM.to_string(),
        prompt,
        temperature: 0.3,
        max_tokens: 1000,
    }
}

/// Build the categorization prompt for one batch. Reviews are indexed from 0
/// within the batch.
pub fn categorization_request(themes: &[DiscoveredTheme], batch: &[Review]) -> CompletionRequest {
    let themes_text = themes
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}: {}", i + 1, t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let reviews_text = batch
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "[{}] [{}★] {}",
                i,
                r.rating,
                truncate_chars(&r.text, CATEGORIZATION_TEXT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Categorize cada review em UM dos temas abaixo. Responda com um array JSON mapeando \
índices de reviews para nomes de temas.

Temas:
{themes_text}
{fallback_no}. {FALLBACK_THEME}: {FALLBACK_DESCRIPTION}

Reviews para categorizar:
{reviews_text}

Responda com array JSON: [{{\"index\": 0, \"theme\": \"Nome do Tema\"}}, ...]
Responda APENAS com JSON válido, sem outro texto.",
        fallback_no = themes.len() + 1,
    );

    CompletionRequest {
        system: CATEGORIZATION_SYSTEM.to_string(),
        prompt,
        temperature: 0.1,
        max_tokens: 1500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn review(text: &str, rating: u8) -> Review {
        Review {
            id: "1".to_string(),
            author: "a".to_string(),
            rating,
            text: text.to_string(),
            date: Utc::now(),
            version: None,
        }
    }

    #[test]
    fn test_discovery_prompt_numbers_and_truncates() {
        let long = "x".repeat(250);
        let a = review("Muito bom", 5);
        let b = review(&long, 1);
        let req = discovery_request(&[&a, &b]);
        assert!(req.prompt.contains("1. [5★] Muito bom"));
        assert!(req.prompt.contains(&format!("2. [1★] {}...", "x".repeat(200))));
        assert!(!req.prompt.contains(&"x".repeat(201)));
        assert_eq!(req.max_tokens, 1000);
    }

    #[test]
    fn test_categorization_prompt_lists_fallback_last() {
        let themes = vec![
            DiscoveredTheme {
                name: "Login".to_string(),
                description: "Acesso à conta".to_string(),
            },
            DiscoveredTheme {
                name: "Preço".to_string(),
                description: "Assinatura".to_string(),
            },
        ];
        let batch = vec![review("Não consigo entrar", 1), review("Caro demais", 2)];
        let req = categorization_request(&themes, &batch);
        assert!(req.prompt.contains("1. Login: Acesso à conta"));
        assert!(req.prompt.contains("3. Outros: "));
        assert!(req.prompt.contains("[0] [1★] Não consigo entrar"));
        assert!(req.prompt.contains("[1] [2★] Caro demais"));
        assert!((req.temperature - 0.1).abs() < f32::EPSILON);
    }
}
