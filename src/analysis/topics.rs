// Rule-based topic clustering over a fixed Portuguese taxonomy.
//
// Matching is non-exclusive: a review is tested against every topic on its
// own, so "lento e travando" lands in both Performance and Bugs.

use tracing::debug;

use super::cluster::{sort_by_count_desc, ClusterStats, TopicCluster};
use super::sentiment::score_review;
use crate::reviews::Review;

/// Sample reviews kept per topic.
pub const TOPIC_SAMPLE_SIZE: usize = 10;

/// A named topic and the lowercase keywords or phrases that signal it.
pub struct TopicDefinition {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

pub const TOPICS: &[TopicDefinition] = &[
    TopicDefinition {
        name: "Performance",
        keywords: &[
            "rápido", "lento", "desempenho", "performance", "demora", "ágil", "fluido",
            "otimizado", "pesado", "consome muita bateria", "ocupa espaço", "carregamento",
            "leve", "demora pra abrir", "tempo de resposta", "estabilidade", "travamento",
            "fluidez",
        ],
    },
    TopicDefinition {
        name: "Interface",
        keywords: &[
            "interface", "design", "aparência", "visual", "layout", "estética", "ícones",
            "cores", "fonte", "estilo", "tema", "aparência limpa", "aparência confusa",
            "moderno", "ultrapassado", "bonito", "feio", "intuitivo", "poluído",
            "organização da tela", "navegação", "menus", "experiência visual",
        ],
    },
    TopicDefinition {
        name: "Funcionalidade",
        keywords: &[
            "funcionalidade", "função", "recurso", "ferramenta", "opção", "módulo",
            "recurso faltando", "recurso novo", "completo", "limitado", "funcional",
            "ineficiente", "faz o que promete", "não funciona", "integração",
            "compatibilidade", "configuração", "automação", "recursos úteis",
            "recursos desnecessários",
        ],
    },
    TopicDefinition {
        name: "Atualização",
        keywords: &[
            "atualização", "update", "versão nova", "versão antiga", "melhorou", "piorou",
            "mudou tudo", "correção", "novidades", "patch", "melhorias", "atualização recente",
            "depois da atualização", "atualização automática", "falta atualização",
            "atualização constante", "atualização demorada",
        ],
    },
    TopicDefinition {
        name: "Suporte",
        keywords: &[
            "suporte", "atendimento", "ajuda", "contato", "resposta", "demora pra responder",
            "equipe", "desenvolvedor", "resolveram", "não resolveram", "suporte técnico",
            "feedback", "responderam rápido", "ignoraram", "chat", "e-mail", "ticket",
            "assistência", "comunicação",
        ],
    },
    TopicDefinition {
        name: "Preço",
        keywords: &[
            "preço", "custo", "caro", "barato", "assinatura", "pagamento", "plano", "gratuito",
            "pago", "vale a pena", "custo-benefício", "promoção", "cobrança", "mensalidade",
            "valor justo", "valor abusivo", "renovação automática", "teste grátis",
            "aumento de preço",
        ],
    },
    TopicDefinition {
        name: "Bugs",
        keywords: &[
            "bug", "erro", "falha", "travar", "travando", "crash", "fechar sozinho", "não abre",
            "problema", "dá erro", "congelar", "lentidão", "glitch", "comportamento estranho",
            "instável", "corrigir bug", "cheio de erros", "problema técnico",
        ],
    },
    TopicDefinition {
        name: "Usabilidade",
        keywords: &[
            "fácil de usar", "difícil de usar", "intuitivo", "confuso", "prático", "simples",
            "complicado", "usabilidade", "experiência do usuário", "navegação fluida",
            "curva de aprendizado", "rápido de entender", "interação", "acessibilidade",
            "fluxo", "confunde", "ajuda", "bem pensado", "mal feito",
        ],
    },
];

impl TopicDefinition {
    /// Whether any keyword occurs in the already-lowercased text.
    pub fn matches(&self, lower_text: &str) -> bool {
        self.keywords.iter().any(|k| lower_text.contains(k))
    }
}

/// Group reviews by taxonomy topic. Topics with no match are omitted and the
/// rest are ordered by match count, largest first.
pub fn extract_topic_clusters(reviews: &[Review]) -> Vec<TopicCluster> {
    let lowered: Vec<String> = reviews.iter().map(|r| r.text.to_lowercase()).collect();

    let mut clusters: Vec<TopicCluster> = TOPICS
        .iter()
        .filter_map(|topic| {
            let mut stats = ClusterStats::new(TOPIC_SAMPLE_SIZE);
            for (review, lower) in reviews.iter().zip(&lowered) {
                if topic.matches(lower) {
                    stats.add(review, score_review(review).sentiment);
                }
            }
            if stats.count == 0 {
                return None;
            }
            debug!(topic = topic.name, matches = stats.count, "Topic matched");
            Some(TopicCluster {
                topic: topic.name.to_string(),
                keywords: topic.keywords.iter().map(|k| k.to_string()).collect(),
                count: stats.count,
                sentiment: stats.sentiment,
                avg_rating: stats.avg_rating(),
                reviews: stats.reviews,
            })
        })
        .collect();

    sort_by_count_desc(&mut clusters);
    clusters
}
