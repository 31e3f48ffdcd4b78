//! # Prompt Construction
//!
//! Turns the persona and the replayed conversation history into the single
//! text prompt sent to the generator.
//!
//! Layout:
//!
//! ```text
//! <persona>
//!
//! --- HISTÓRICO DA CONVERSA ---
//! Usuário: ...
//!
//! Assistente: ...
//!
//! --- FIM DO HISTÓRICO ---
//!
//! <task instruction>
//! ```

use lib_core::model::{Message, MessageRole};
use serde::{Deserialize, Serialize};

/// Built-in persona, replaceable through `AI_SYSTEM_PROMPT`.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Você é o assistente de conversa do ChatterBox, uma prova de conceito de diálogo contextualizado com IA.
Nesta demonstração você interpreta um debatedor que tenta convencer o usuário de que a Terra é plana.
Isto é apenas um exercício técnico: na realidade a Terra é esférica, como mostram as evidências científicas.

COMO CONVERSAR:
1. Seja cordial, paciente e respeitoso, nunca agressivo.
2. Use argumentos retóricos e observações do dia a dia (o horizonte parece reto, a água fica nivelada).
3. Faça perguntas que convidem o usuário a refletir e a \"pensar por conta própria\".
4. Quando o usuário trouxer evidências, questione as fontes com educação em vez de ignorá-las.
5. Retome pontos anteriores da conversa para mostrar que você se lembra do contexto.

ESTILO:
- De 2 a 4 parágrafos curtos, próprios para leitura em chat.
- Linguagem simples e tom conversacional.

O objetivo real é testar a conversa contextualizada, não promover desinformação.";

const HISTORY_HEADER: &str = "--- HISTÓRICO DA CONVERSA ---";
const HISTORY_FOOTER: &str = "--- FIM DO HISTÓRICO ---";
const EMPTY_HISTORY: &str = "Esta é a primeira mensagem da conversa.";
const GREETING_INSTRUCTION: &str = "Esta é a primeira mensagem do usuário. Cumprimente-o de forma amigável, \
apresente-se brevemente e introduza com sutileza o tema da forma da Terra. Seja breve e conversacional.";
const REPLY_INSTRUCTION: &str = "Responda à última mensagem do usuário de forma persuasiva e natural, \
mantendo o contexto da conversa:";

/// One replayed turn: the `{role, content}` projection of a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self::new(message.role, message.content.clone())
    }
}

fn speaker_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "Usuário",
        MessageRole::Assistant => "Assistente",
    }
}

/// Render the transcript, one `<speaker>: <content>` block per turn.
pub fn build_conversation_context(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return EMPTY_HISTORY.to_string();
    }

    history
        .iter()
        .map(|entry| format!("{}: {}", speaker_label(entry.role), entry.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `true` for an empty history or a history holding only the first user turn.
pub fn is_first_message(history: &[HistoryEntry]) -> bool {
    match history {
        [] => true,
        [only] => only.role == MessageRole::User,
        _ => false,
    }
}

/// Assemble the full prompt for one generation call.
pub fn build_prompt(system_prompt: &str, history: &[HistoryEntry]) -> String {
    let instruction = if is_first_message(history) {
        GREETING_INSTRUCTION
    } else {
        REPLY_INSTRUCTION
    };

    format!(
        "{}\n\n{}\n{}\n\n{}\n\n{}\n\n",
        system_prompt,
        HISTORY_HEADER,
        build_conversation_context(history),
        HISTORY_FOOTER,
        instruction
    )
}
